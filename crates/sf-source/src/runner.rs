//! Submitting remote operations and polling them to completion.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use busbar_sf_metadata::{DeployOptions, DeployResult, RetrieveResult};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

use crate::component_set::ComponentSet;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::Result;
use crate::operation::{
    DeployOutcome, OperationHandle, OperationKind, OperationResult, OperationStatus,
    RetrieveOutcome,
};
use crate::reconcile;
use crate::transport::MetadataTransport;

/// Per-run retrieve options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Overwrite-merge into the existing source tree instead of writing a
    /// fresh metadata-format tree.
    pub merge: bool,
    pub wait: Duration,
}

/// Drives one remote operation from submission to a terminal status or the
/// end of the wait budget.
///
/// Hitting the deadline is not an error here: the last `InProgress` handle
/// is returned and classification happens later.
#[derive(Clone)]
pub struct OperationRunner {
    transport: Arc<dyn MetadataTransport>,
    poll_interval: Duration,
}

impl std::fmt::Debug for OperationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRunner")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl OperationRunner {
    pub fn new(transport: Arc<dyn MetadataTransport>) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Check immediately, then sleep and check again until a terminal status
    /// or the deadline. Sleeps never run past the deadline, so the overshoot
    /// is at most one status call.
    async fn poll<T, F, Fut>(
        &self,
        wait: Duration,
        status_of: fn(&T) -> OperationStatus,
        mut check: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = busbar_sf_metadata::Result<T>>,
    {
        // A budget past the end of the clock polls until a terminal status.
        let deadline = Instant::now().checked_add(wait);
        let mut checks = 0u32;
        loop {
            let last = check().await?;
            checks += 1;
            let status = status_of(&last);
            debug!(?status, checks, "polled operation");

            if status.is_terminal() {
                return Ok(last);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        info!(?status, checks, "wait budget exhausted");
                        return Ok(last);
                    }
                    self.poll_interval.min(deadline - now)
                }
                None => self.poll_interval,
            };
            sleep(pause).await;
        }
    }

    /// Retrieve the component set into `base_path`.
    #[instrument(skip(self, components, base_path))]
    pub async fn submit_and_wait(
        &self,
        components: &ComponentSet,
        target: &str,
        base_path: &Path,
        options: RunOptions,
    ) -> Result<OperationHandle> {
        let request = components.retrieve_request();
        let id = self.transport.submit_retrieve(&request).await?;
        info!(%id, "retrieve submitted");

        let transport = self.transport.as_ref();
        let async_id = id.as_str();
        let result = self
            .poll(
                options.wait,
                |r: &RetrieveResult| r.status.into(),
                || transport.check_retrieve(async_id),
            )
            .await?;

        let status = OperationStatus::from(result.status);
        let mut outcome = RetrieveOutcome {
            done: result.done,
            file_properties: result.file_properties,
            id: result.id,
            status,
            success: result.success,
            zip_file_path: None,
            messages: result.messages,
            inbound_files: Vec::new(),
            error_message: result.error_message,
        };

        if status == OperationStatus::Succeeded {
            if let Some(zip) = result.zip_file.as_deref() {
                let artifacts =
                    reconcile::apply(zip, &outcome.file_properties, base_path, options.merge)?;
                outcome.zip_file_path = Some(artifacts.zip_file_path.display().to_string());
                outcome.inbound_files = artifacts.inbound_files;
            }
        }

        Ok(OperationHandle {
            kind: OperationKind::Retrieve,
            id,
            status,
            result: OperationResult::Retrieve(outcome),
        })
    }

    /// Deploy the component set's local sources.
    #[instrument(skip(self, components, options))]
    pub async fn deploy_and_wait(
        &self,
        components: &ComponentSet,
        options: &DeployOptions,
        wait: Duration,
    ) -> Result<OperationHandle> {
        let zip = components.to_deploy_zip()?;
        let id = self.transport.submit_deploy(&zip, options).await?;
        info!(%id, check_only = options.check_only, "deploy submitted");

        let transport = self.transport.as_ref();
        let async_id = id.as_str();
        let result = self
            .poll(
                wait,
                |r: &DeployResult| r.status.into(),
                || transport.check_deploy(async_id),
            )
            .await?;

        let outcome = DeployOutcome::from(result);
        Ok(OperationHandle {
            kind: OperationKind::Deploy,
            id,
            status: outcome.status,
            result: OperationResult::Deploy(outcome),
        })
    }
}
