//! Credentials trait and implementations.
//!
//! All credential types implement custom Debug to redact sensitive data.

use busbar_sf_client::security::url;
use tracing::debug;

use crate::alias::AliasStore;
use crate::error::{Error, ErrorKind, Result};

/// Trait for Salesforce credentials.
pub trait Credentials: Send + Sync {
    /// Get the Salesforce instance URL.
    fn instance_url(&self) -> &str;

    /// Get the access token.
    fn access_token(&self) -> &str;

    /// Get the API version (e.g., "62.0").
    fn api_version(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_url().is_empty() && !self.access_token().is_empty()
    }
}

/// Credentials for one target org.
///
/// The username identifies the org in user-facing messages; the access
/// token is redacted in Debug output to prevent accidental exposure in logs.
#[derive(Clone)]
pub struct SalesforceCredentials {
    instance_url: String,
    access_token: String,
    api_version: String,
    username: Option<String>,
}

impl std::fmt::Debug for SalesforceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceCredentials")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .finish()
    }
}

impl SalesforceCredentials {
    /// Create new credentials with the given values.
    pub fn new(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: api_version.into(),
            username: None,
        }
    }

    /// Attach the username of the org these credentials belong to.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Username of the target org, if known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Name used for the org in messages: the username, or the instance URL
    /// when the username is unknown.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.instance_url)
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the Metadata API SOAP endpoint.
    pub fn metadata_api_url(&self) -> String {
        format!(
            "{}/services/Soap/m/{}",
            self.instance_url, self.api_version
        )
    }

    /// Load credentials from environment variables.
    ///
    /// Required environment variables:
    /// - `SF_INSTANCE_URL` or `SALESFORCE_INSTANCE_URL`
    /// - `SF_ACCESS_TOKEN` or `SALESFORCE_ACCESS_TOKEN`
    ///
    /// Optional:
    /// - `SF_API_VERSION` or `SALESFORCE_API_VERSION` (default: "62.0")
    /// - `SF_USERNAME` or `SALESFORCE_USERNAME`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let first = |keys: [&str; 2]| keys.iter().find_map(|k| lookup(k));

        let instance_url = first(["SF_INSTANCE_URL", "SALESFORCE_INSTANCE_URL"])
            .ok_or_else(|| Error::new(ErrorKind::EnvVar("SF_INSTANCE_URL".to_string())))?;
        let access_token = first(["SF_ACCESS_TOKEN", "SALESFORCE_ACCESS_TOKEN"])
            .ok_or_else(|| Error::new(ErrorKind::EnvVar("SF_ACCESS_TOKEN".to_string())))?;
        let api_version = first(["SF_API_VERSION", "SALESFORCE_API_VERSION"])
            .unwrap_or_else(|| busbar_sf_client::DEFAULT_API_VERSION.to_string());

        let mut creds = Self::new(url::instance_url(&instance_url)?, access_token, api_version);
        if let Some(username) = first(["SF_USERNAME", "SALESFORCE_USERNAME"]) {
            creds = creds.with_username(username);
        }
        Ok(creds)
    }

    /// Load credentials from SFDX CLI using an org alias or username.
    ///
    /// Aliases are resolved through the local alias store first, then
    /// `sf org display` is asked for a fresh access token. Requires the `sf`
    /// CLI to be installed and the org to be authenticated.
    pub async fn from_sfdx_alias(alias_or_username: &str) -> Result<Self> {
        use tokio::process::Command;

        let aliases = AliasStore::load_default()?;
        let target = aliases.resolve(alias_or_username).to_string();
        debug!(alias = alias_or_username, username = %target, "resolving target org");

        let output = Command::new("sf")
            .args(["org", "display", "--target-org", &target, "--json"])
            .output()
            .await
            .map_err(|e| Error::new(ErrorKind::SfdxCli(format!("Failed to run sf CLI: {}", e))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::new(ErrorKind::SfdxCli(format!(
                "sf org display failed: {}",
                busbar_sf_client::security::redact::sanitize(&stderr)
            ))));
        }

        Self::from_org_display(&output.stdout, &target)
    }

    /// Parse the JSON printed by `sf org display --json`.
    pub(crate) fn from_org_display(stdout: &[u8], fallback_username: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_slice(stdout)?;

        let result = json.get("result").ok_or_else(|| {
            Error::new(ErrorKind::SfdxCli("Missing 'result' in output".to_string()))
        })?;

        let field = |name: &str| result.get(name).and_then(|v| v.as_str());

        let instance_url = field("instanceUrl")
            .ok_or_else(|| Error::new(ErrorKind::SfdxCli("Missing instanceUrl".to_string())))?;
        let access_token = field("accessToken")
            .ok_or_else(|| Error::new(ErrorKind::SfdxCli("Missing accessToken".to_string())))?;
        let api_version = field("apiVersion").unwrap_or(busbar_sf_client::DEFAULT_API_VERSION);
        let username = field("username").unwrap_or(fallback_username);

        Ok(Self::new(url::instance_url(instance_url)?, access_token, api_version)
            .with_username(username))
    }
}

impl Credentials for SalesforceCredentials {
    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
