//! # sf-source
//!
//! Retrieve, deploy and list orchestration for Salesforce DX projects.
//!
//! A command runs in a fixed order:
//!
//! 1. the selection flags resolve to one [`WorkItem`]
//! 2. a [`ComponentSetBuilder`] turns it into a [`ComponentSet`]
//! 3. the `pre` lifecycle event fires with the `package.xml` path
//! 4. the [`OperationRunner`] submits once and polls until a terminal status
//!    or the wait budget runs out
//! 5. the `post` lifecycle event fires with the last polled result
//! 6. the handle is classified into a [`CommandOutcome`]
//!
//! Listing is simpler: one `listMetadata` call whose response is flattened
//! into a `Vec` by the [`MetadataLister`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_source::{commands, RetrieveCommand, SfProject, SourceContext};
//!
//! let project = SfProject::resolve(&std::env::current_dir()?)?;
//! let transport = busbar_sf_source::connect(&creds, &Default::default(), None)?;
//! let context = SourceContext::new(project, transport, creds.display_name());
//!
//! let mut command = RetrieveCommand::default();
//! command.input.metadata = vec!["ApexClass".to_string()];
//! let outcome = commands::retrieve(&context, &command).await?;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod classify;
pub mod commands;
pub mod component_set;
pub mod config;
mod error;
pub mod input;
pub mod lifecycle;
pub mod lister;
pub mod operation;
pub mod output;
pub mod project;
pub mod reconcile;
pub mod registry;
pub mod runner;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use classify::{classify, conclude, Classification, CommandOutcome};
pub use commands::{DeployCommand, ListCommand, ListReport, RetrieveCommand, SourceContext};
pub use component_set::{ComponentSet, ComponentSetBuilder, ProjectComponentSetBuilder};
pub use config::{SourceConfig, WaitBudget};
pub use error::{Error, ErrorKind, Result};
pub use input::{DeployInput, RetrieveInput, WorkDescriptor, WorkItem};
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleListener};
pub use lister::MetadataLister;
pub use operation::{OperationHandle, OperationKind, OperationResult, OperationStatus};
pub use project::{PackageDirectory, SfProject};
pub use runner::{OperationRunner, RunOptions};
pub use transport::{connect, MetadataTransport};
