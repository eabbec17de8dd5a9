//! Lifecycle events emitted around retrieve and deploy.
//!
//! A [`Lifecycle`] is built once at startup and handed to the commands.
//! Listeners run one at a time in registration order; the first failure
//! stops delivery and fails the command.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::project::SfProject;

pub const PRE_RETRIEVE: &str = "preretrieve";
pub const POST_RETRIEVE: &str = "postretrieve";
pub const PRE_DEPLOY: &str = "predeploy";
pub const POST_DEPLOY: &str = "postdeploy";

pub const EVENTS: [&str; 4] = [PRE_RETRIEVE, POST_RETRIEVE, PRE_DEPLOY, POST_DEPLOY];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEvent {
    pub name: String,
    pub payload: Value,
}

#[async_trait]
pub trait LifecycleListener: Send + Sync {
    async fn on_event(&self, event: &LifecycleEvent) -> anyhow::Result<()>;
}

/// Ordered event subscriptions.
#[derive(Clone, Default)]
pub struct Lifecycle {
    listeners: Vec<(String, Arc<dyn LifecycleListener>)>,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field(
                "events",
                &self.listeners.iter().map(|(e, _)| e.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracing for every event, then the project's command hooks.
    pub fn for_project(project: &SfProject) -> Self {
        let mut lifecycle = Self::new();
        let tracing_listener: Arc<dyn LifecycleListener> = Arc::new(TracingListener);
        for event in EVENTS {
            lifecycle.subscribe(event, tracing_listener.clone());
        }
        for (event, command) in project.hooks() {
            lifecycle.subscribe(
                event,
                Arc::new(CommandHookListener::new(command, project.root())),
            );
        }
        lifecycle
    }

    pub fn subscribe(
        &mut self,
        event: impl Into<String>,
        listener: Arc<dyn LifecycleListener>,
    ) -> &mut Self {
        self.listeners.push((event.into(), listener));
        self
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.iter().filter(|(e, _)| e == event).count()
    }

    /// Deliver `payload` to every listener of `event`, serially.
    #[instrument(skip(self, payload))]
    pub async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        let event_value = LifecycleEvent {
            name: event.to_string(),
            payload,
        };
        for (_, listener) in self.listeners.iter().filter(|(e, _)| e == event) {
            listener.on_event(&event_value).await.map_err(|err| {
                let message = format!("{:#}", err);
                let kind = ErrorKind::Hook {
                    event: event.to_string(),
                    message,
                };
                Error {
                    kind,
                    source: Some(err.into()),
                }
            })?;
        }
        Ok(())
    }
}

/// Logs every event it receives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

#[async_trait]
impl LifecycleListener for TracingListener {
    async fn on_event(&self, event: &LifecycleEvent) -> anyhow::Result<()> {
        debug!(event = %event.name, payload = %event.payload, "lifecycle event");
        Ok(())
    }
}

/// Runs a shell command with the event payload as JSON on stdin.
///
/// The event name is exported as `SF_SOURCE_HOOK_EVENT`. A non-zero exit
/// fails the event.
#[derive(Debug, Clone)]
pub struct CommandHookListener {
    command: String,
    working_dir: PathBuf,
}

impl CommandHookListener {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl LifecycleListener for CommandHookListener {
    async fn on_event(&self, event: &LifecycleEvent) -> anyhow::Result<()> {
        let input = serde_json::to_vec(&event.payload)?;

        let mut child = self
            .shell()
            .current_dir(&self.working_dir)
            .env("SF_SOURCE_HOOK_EVENT", &event.name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to start hook `{}`: {}", self.command, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A hook may exit without reading its input.
            if let Err(e) = stdin.write_all(&input).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        debug!(
            command = %self.command,
            status = %output.status,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "hook finished"
        );

        if !output.status.success() {
            anyhow::bail!(
                "hook `{}` exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
