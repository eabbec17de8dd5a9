//! # busbar-sf
//!
//! Retrieve, deploy and list Salesforce metadata from a DX project.
//!
//! The `sf-source` binary is a thin clap front end over
//! [`busbar_sf_source`]. This crate re-exports the workspace so tools can
//! drive the same flows directly.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **busbar-sf-client** - HTTP client configuration, XML escaping, redaction
//! - **busbar-sf-auth** - Target org credentials from env vars or the sf CLI
//! - **busbar-sf-metadata** - Metadata API: retrieve, deploy, list
//! - **busbar-sf-source** - Orchestration: input resolution, component sets,
//!   lifecycle hooks, polling, classification and output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use busbar_sf::{source, SalesforceCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = SalesforceCredentials::from_sfdx_alias("my-org").await?;
//!     let transport = source::connect(&creds, &Default::default(), None)?;
//!
//!     let report = source::commands::list(
//!         transport,
//!         &source::ListCommand {
//!             metadata_type: "ApexClass".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//!     for record in report.records {
//!         println!("{}", record.full_name);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use busbar_sf_auth as auth;
pub use busbar_sf_client as client;
pub use busbar_sf_metadata as metadata;
pub use busbar_sf_source as source;

// Re-export commonly used types at the top level
pub use busbar_sf_auth::{Credentials, SalesforceCredentials};
pub use busbar_sf_client::ClientConfig;
pub use busbar_sf_metadata::MetadataClient;
pub use busbar_sf_source::{CommandOutcome, SfProject, SourceContext};
