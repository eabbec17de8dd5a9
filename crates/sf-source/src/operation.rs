//! Remote operation handles and their result payloads.

use busbar_sf_metadata::{
    DeployMessage, DeployResult, DeployStatus, FileProperties, RetrieveMessage, RetrieveStatus,
    TestFailure,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Retrieve,
    Deploy,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Retrieve => write!(f, "retrieve"),
            OperationKind::Deploy => write!(f, "deploy"),
        }
    }
}

/// Status of a remote job as seen by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationStatus {
    Queued,
    InProgress,
    Succeeded,
    Failed,
    SucceededPartial,
    Canceled,
}

impl OperationStatus {
    /// A terminal status never changes again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded
                | OperationStatus::Failed
                | OperationStatus::SucceededPartial
                | OperationStatus::Canceled
        )
    }
}

impl From<RetrieveStatus> for OperationStatus {
    fn from(status: RetrieveStatus) -> Self {
        match status {
            RetrieveStatus::Pending => OperationStatus::Queued,
            RetrieveStatus::InProgress | RetrieveStatus::Canceling => OperationStatus::InProgress,
            RetrieveStatus::Succeeded => OperationStatus::Succeeded,
            RetrieveStatus::Failed => OperationStatus::Failed,
            RetrieveStatus::Canceled => OperationStatus::Canceled,
        }
    }
}

impl From<DeployStatus> for OperationStatus {
    fn from(status: DeployStatus) -> Self {
        match status {
            DeployStatus::Pending => OperationStatus::Queued,
            DeployStatus::InProgress | DeployStatus::Canceling => OperationStatus::InProgress,
            DeployStatus::Succeeded => OperationStatus::Succeeded,
            DeployStatus::SucceededPartial => OperationStatus::SucceededPartial,
            DeployStatus::Failed => OperationStatus::Failed,
            DeployStatus::Canceled => OperationStatus::Canceled,
        }
    }
}

/// A file written locally by a retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFile {
    pub state: FileState,
    pub full_name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileState {
    Created,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOutcome {
    pub done: bool,
    pub file_properties: Vec<FileProperties>,
    pub id: String,
    pub status: OperationStatus,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_file_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<RetrieveMessage>,
    pub inbound_files: Vec<InboundFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub done: bool,
    pub id: String,
    pub status: OperationStatus,
    pub success: bool,
    pub check_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_detail: Option<String>,
    pub number_components_deployed: u32,
    pub number_component_errors: u32,
    pub number_components_total: u32,
    pub number_tests_completed: u32,
    pub number_test_errors: u32,
    pub number_tests_total: u32,
    pub component_successes: Vec<DeployMessage>,
    pub component_failures: Vec<DeployMessage>,
    pub test_failures: Vec<TestFailure>,
}

impl From<DeployResult> for DeployOutcome {
    fn from(result: DeployResult) -> Self {
        Self {
            done: result.done,
            id: result.id,
            status: result.status.into(),
            success: result.success,
            check_only: result.check_only,
            error_message: result.error_message,
            state_detail: result.state_detail,
            number_components_deployed: result.number_components_deployed,
            number_component_errors: result.number_component_errors,
            number_components_total: result.number_components_total,
            number_tests_completed: result.number_tests_completed,
            number_test_errors: result.number_test_errors,
            number_tests_total: result.number_tests_total,
            component_successes: result.component_successes,
            component_failures: result.component_failures,
            test_failures: result.test_failures,
        }
    }
}

/// The last payload polled for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Retrieve(RetrieveOutcome),
    Deploy(DeployOutcome),
}

/// A remote long-running job and what is known about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationHandle {
    pub kind: OperationKind,
    pub id: String,
    pub status: OperationStatus,
    pub result: OperationResult,
}
