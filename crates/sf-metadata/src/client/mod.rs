//! Metadata API client.

use busbar_sf_auth::{Credentials, SalesforceCredentials};
use busbar_sf_client::security::redact;
use busbar_sf_client::ClientConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::types::DEFAULT_API_VERSION;

mod deploy;
mod list;
mod retrieve;
mod xml_helpers;

/// SOAP Action header name.
static SOAP_ACTION_HEADER: HeaderName = HeaderName::from_static("soapaction");

/// Salesforce Metadata API client.
///
/// Each method maps to one SOAP call. Polling of long-running operations is
/// left to the caller.
pub struct MetadataClient {
    instance_url: String,
    access_token: String,
    api_version: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl MetadataClient {
    /// Create a new Metadata API client from credentials.
    pub fn new(credentials: &SalesforceCredentials) -> Result<Self> {
        Self::with_config(credentials, &ClientConfig::default())
    }

    /// Create a client whose HTTP layer is built from `config`.
    pub fn with_config(credentials: &SalesforceCredentials, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            instance_url: credentials.instance_url().to_string(),
            access_token: credentials.access_token().to_string(),
            api_version: credentials.api_version().to_string(),
            http_client: config.http_client()?,
        })
    }

    /// Create a new Metadata API client from instance URL and access token.
    pub fn from_parts(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// The API version used for the endpoint and request bodies.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the Metadata API SOAP endpoint URL.
    pub(crate) fn metadata_url(&self) -> String {
        format!("{}/services/Soap/m/{}", self.instance_url, self.api_version)
    }

    /// Build common headers for SOAP requests.
    pub(crate) fn build_headers(&self, soap_action: &str) -> Result<HeaderMap> {
        let invalid =
            |what: &str| Error::new(ErrorKind::Client(format!("invalid {} header", what)));

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml;charset=UTF-8"),
        );
        headers.insert(
            SOAP_ACTION_HEADER.clone(),
            HeaderValue::from_str(soap_action).map_err(|_| invalid("SOAPAction"))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|_| invalid("Authorization"))?,
        );
        Ok(headers)
    }

    /// Wrap a request body in a SOAP envelope carrying the session header.
    pub(crate) fn envelope(&self, body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Header>
    <SessionHeader xmlns="http://soap.sforce.com/2006/04/metadata">
      <sessionId>{session_id}</sessionId>
    </SessionHeader>
  </soap:Header>
  <soap:Body>
    {body}
  </soap:Body>
</soap:Envelope>"#,
            session_id = busbar_sf_client::security::xml::escape(&self.access_token),
            body = body,
        )
    }

    /// Send one SOAP call and return the raw response body.
    ///
    /// SOAP faults and non-success HTTP statuses become errors.
    #[instrument(skip(self, body))]
    pub(crate) async fn call(&self, action: &str, body: &str) -> Result<String> {
        let response = self
            .http_client
            .post(self.metadata_url())
            .headers(self.build_headers(action)?)
            .body(self.envelope(body))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!(%status, bytes = response_text.len(), "metadata API response");

        if let Some(fault) = xml_helpers::parse_soap_fault(&response_text) {
            return Err(Error::with_source(
                ErrorKind::SoapFault(redact::sanitize(&fault.to_string())),
                fault,
            ));
        }

        if !status.is_success() {
            return Err(Error::new(ErrorKind::Http(format!(
                "{}: {}",
                status,
                redact::sanitize(&response_text)
            ))));
        }

        Ok(response_text)
    }
}
