//! Deploy operations.

use crate::types::TestLevel;
use serde::{Deserialize, Serialize};

/// Options for deployment.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Allow references to missing files in the zip.
    pub allow_missing_files: bool,
    /// Validate only, don't actually deploy.
    pub check_only: bool,
    /// Ignore warnings during deployment.
    pub ignore_warnings: bool,
    /// Hard delete components (only in sandbox/DE orgs).
    pub purge_on_delete: bool,
    /// Rollback all changes if any component fails.
    pub rollback_on_error: bool,
    /// Deploy as a single package.
    pub single_package: bool,
    /// Test level for deployment.
    pub test_level: Option<TestLevel>,
    /// Specific tests to run (when test_level is RunSpecifiedTests).
    pub run_tests: Vec<String>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            allow_missing_files: false,
            check_only: false,
            ignore_warnings: false,
            purge_on_delete: false,
            rollback_on_error: true,
            single_package: true,
            test_level: None,
            run_tests: vec![],
        }
    }
}

/// Deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStatus {
    Pending,
    InProgress,
    Succeeded,
    SucceededPartial,
    Failed,
    Canceling,
    Canceled,
}

impl std::str::FromStr for DeployStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DeployStatus::Pending),
            "InProgress" => Ok(DeployStatus::InProgress),
            "Succeeded" => Ok(DeployStatus::Succeeded),
            "SucceededPartial" => Ok(DeployStatus::SucceededPartial),
            "Failed" => Ok(DeployStatus::Failed),
            "Canceling" => Ok(DeployStatus::Canceling),
            "Canceled" => Ok(DeployStatus::Canceled),
            _ => Err(format!("Unknown deploy status: {}", s)),
        }
    }
}

/// Result of a `checkDeployStatus` call.
#[derive(Debug, Clone)]
pub struct DeployResult {
    /// Async process ID.
    pub id: String,
    /// Whether the operation is complete.
    pub done: bool,
    /// Current status.
    pub status: DeployStatus,
    /// Whether the deployment succeeded.
    pub success: bool,
    /// Whether this was a validation-only deploy.
    pub check_only: bool,
    /// Error message if failed.
    pub error_message: Option<String>,
    /// State detail message.
    pub state_detail: Option<String>,
    pub number_components_deployed: u32,
    pub number_component_errors: u32,
    pub number_components_total: u32,
    pub number_tests_completed: u32,
    pub number_test_errors: u32,
    pub number_tests_total: u32,
    pub component_failures: Vec<DeployMessage>,
    pub component_successes: Vec<DeployMessage>,
    pub test_failures: Vec<TestFailure>,
}

/// One `componentSuccesses` or `componentFailures` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    pub created: bool,
    pub changed: bool,
    pub deleted: bool,
    pub success: bool,
}

/// A test failure during deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailure {
    pub name: Option<String>,
    pub method_name: Option<String>,
    pub message: Option<String>,
    pub stack_trace: Option<String>,
}
