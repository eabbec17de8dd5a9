//! Retrieve, deploy and list flows.
//!
//! Each flow takes a [`SourceContext`] built once at startup and returns a
//! [`CommandOutcome`](crate::classify::CommandOutcome) (or the list records)
//! for the formatter.

mod deploy;
mod list;
mod retrieve;

use std::sync::Arc;
use std::time::Duration;

pub use deploy::{deploy, DeployCommand};
pub use list::{list, ListCommand, ListReport};
pub use retrieve::{retrieve, RetrieveCommand};

use crate::component_set::{ComponentSetBuilder, ProjectComponentSetBuilder};
use crate::config::SourceConfig;
use crate::lifecycle::Lifecycle;
use crate::project::SfProject;
use crate::runner::OperationRunner;
use crate::transport::MetadataTransport;

/// Everything a retrieve or deploy needs besides its flags.
#[derive(Clone)]
pub struct SourceContext {
    project: SfProject,
    lifecycle: Lifecycle,
    transport: Arc<dyn MetadataTransport>,
    builder: Arc<dyn ComponentSetBuilder>,
    target_org: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext")
            .field("project", &self.project.root())
            .field("lifecycle", &self.lifecycle)
            .field("target_org", &self.target_org)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl SourceContext {
    /// Project hooks, the registry-backed builder and the default poll
    /// interval.
    pub fn new(
        project: SfProject,
        transport: Arc<dyn MetadataTransport>,
        target_org: impl Into<String>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::for_project(&project),
            builder: Arc::new(ProjectComponentSetBuilder::for_project(&project)),
            project,
            transport,
            target_org: target_org.into(),
            poll_interval: SourceConfig::default().poll_interval,
        }
    }

    pub fn with_config(mut self, config: &SourceConfig) -> Self {
        self.poll_interval = config.poll_interval;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_builder(mut self, builder: Arc<dyn ComponentSetBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn project(&self) -> &SfProject {
        &self.project
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn target_org(&self) -> &str {
        &self.target_org
    }

    pub(crate) fn runner(&self) -> OperationRunner {
        OperationRunner::new(self.transport.clone()).with_poll_interval(self.poll_interval)
    }
}
