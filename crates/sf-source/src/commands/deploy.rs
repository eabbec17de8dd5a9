use busbar_sf_metadata::DeployOptions;
use serde_json::json;
use tracing::{info, instrument};

use super::SourceContext;
use crate::classify::{conclude, CommandOutcome};
use crate::config::WaitBudget;
use crate::error::Result;
use crate::input::{resolve_deploy_input, DeployInput};
use crate::lifecycle::{POST_DEPLOY, PRE_DEPLOY};

/// Flags of one `deploy` invocation.
#[derive(Debug, Clone, Default)]
pub struct DeployCommand {
    pub input: DeployInput,
    pub wait: WaitBudget,
    pub options: DeployOptions,
}

/// Resolve, build, emit `predeploy`, deploy, emit `postdeploy`, classify.
#[instrument(
    skip_all,
    fields(target_org = %context.target_org(), check_only = command.options.check_only)
)]
pub async fn deploy(context: &SourceContext, command: &DeployCommand) -> Result<CommandOutcome> {
    let work = resolve_deploy_input(&command.input)?;
    let components = context
        .builder
        .build(&work, context.project.package_directories())?;
    let package_xml = components.package_xml_path()?;

    context
        .lifecycle
        .emit(
            PRE_DEPLOY,
            json!({ "packageXmlPath": package_xml.display().to_string() }),
        )
        .await?;

    let handle = context
        .runner()
        .deploy_and_wait(&components, &command.options, command.wait.duration())
        .await?;
    info!(id = %handle.id, status = ?handle.status, "deploy finished polling");

    context
        .lifecycle
        .emit(POST_DEPLOY, serde_json::to_value(&handle.result)?)
        .await?;

    conclude(handle, command.wait)
}
