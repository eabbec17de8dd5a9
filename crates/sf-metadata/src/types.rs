//! Common types for Metadata API.

use serde::{Deserialize, Serialize};

/// Default Metadata API version.
pub const DEFAULT_API_VERSION: &str = busbar_sf_client::DEFAULT_API_VERSION;

/// Test level for deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TestLevel {
    /// No tests run.
    #[default]
    NoTestRun,
    /// Run local tests only.
    RunLocalTests,
    /// Run all tests in org.
    RunAllTestsInOrg,
    /// Run specified tests.
    RunSpecifiedTests,
}

impl std::fmt::Display for TestLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestLevel::NoTestRun => write!(f, "NoTestRun"),
            TestLevel::RunLocalTests => write!(f, "RunLocalTests"),
            TestLevel::RunAllTestsInOrg => write!(f, "RunAllTestsInOrg"),
            TestLevel::RunSpecifiedTests => write!(f, "RunSpecifiedTests"),
        }
    }
}

impl std::str::FromStr for TestLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoTestRun" => Ok(TestLevel::NoTestRun),
            "RunLocalTests" => Ok(TestLevel::RunLocalTests),
            "RunAllTestsInOrg" => Ok(TestLevel::RunAllTestsInOrg),
            "RunSpecifiedTests" => Ok(TestLevel::RunSpecifiedTests),
            _ => Err(format!("Unknown test level: {}", s)),
        }
    }
}

/// SOAP Fault from the Metadata API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoapFault {
    pub fault_code: String,
    pub fault_string: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.fault_code, self.fault_string)
    }
}

impl std::error::Error for SoapFault {}

/// Properties of one remote metadata file.
///
/// Returned by `listMetadata` and inside retrieve results. Serialized in
/// the platform's camelCase shape so result files match what other tools
/// produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileProperties {
    pub created_by_id: String,
    pub created_by_name: String,
    pub created_date: String,
    pub file_name: String,
    pub full_name: String,
    pub id: String,
    pub last_modified_by_id: String,
    pub last_modified_by_name: String,
    pub last_modified_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manageable_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_prefix: Option<String>,
    #[serde(rename = "type")]
    pub component_type: String,
}
