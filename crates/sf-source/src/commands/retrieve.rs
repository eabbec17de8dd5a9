use std::path::PathBuf;

use serde_json::json;
use tracing::{info, instrument};

use super::SourceContext;
use crate::classify::{conclude, CommandOutcome};
use crate::config::WaitBudget;
use crate::error::Result;
use crate::input::{resolve_retrieve_input, RetrieveInput};
use crate::lifecycle::{POST_RETRIEVE, PRE_RETRIEVE};
use crate::runner::RunOptions;

/// Flags of one `retrieve` invocation.
#[derive(Debug, Clone, Default)]
pub struct RetrieveCommand {
    pub input: RetrieveInput,
    pub wait: WaitBudget,
    /// Write a metadata-format tree here instead of merging into the
    /// default package directory.
    pub retrieve_target_dir: Option<PathBuf>,
}

/// Resolve, build, emit `preretrieve`, retrieve, emit `postretrieve`,
/// classify.
#[instrument(skip_all, fields(target_org = %context.target_org()))]
pub async fn retrieve(
    context: &SourceContext,
    command: &RetrieveCommand,
) -> Result<CommandOutcome> {
    let work = resolve_retrieve_input(&command.input)?;
    let components = context
        .builder
        .build(&work, context.project.package_directories())?;
    let package_xml = components.package_xml_path()?;

    context
        .lifecycle
        .emit(
            PRE_RETRIEVE,
            json!({ "packageXmlPath": package_xml.display().to_string() }),
        )
        .await?;

    let (base_path, merge) = match &command.retrieve_target_dir {
        Some(dir) => (context.project.root().join(dir), false),
        None => (context.project.default_package_directory().path.clone(), true),
    };
    let options = RunOptions {
        merge,
        wait: command.wait.duration(),
    };
    let handle = context
        .runner()
        .submit_and_wait(&components, &context.target_org, &base_path, options)
        .await?;
    info!(id = %handle.id, status = ?handle.status, "retrieve finished polling");

    context
        .lifecycle
        .emit(POST_RETRIEVE, serde_json::to_value(&handle.result)?)
        .await?;

    conclude(handle, command.wait)
}
