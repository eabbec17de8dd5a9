//! The seam between orchestration and the Metadata API.

use std::sync::Arc;

use async_trait::async_trait;
use busbar_sf_auth::{Credentials, SalesforceCredentials};
use busbar_sf_client::ClientConfig;
use busbar_sf_metadata::{
    DeployOptions, DeployResult, ListMetadataResponse, ListQuery, MetadataClient,
    RetrieveRequest, RetrieveResult,
};

/// Remote calls the runner and lister depend on.
///
/// Every method is one request; polling lives in the runner.
#[async_trait]
pub trait MetadataTransport: Send + Sync {
    async fn submit_retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> busbar_sf_metadata::Result<String>;

    async fn check_retrieve(&self, id: &str) -> busbar_sf_metadata::Result<RetrieveResult>;

    async fn submit_deploy(
        &self,
        zip: &[u8],
        options: &DeployOptions,
    ) -> busbar_sf_metadata::Result<String>;

    async fn check_deploy(&self, id: &str) -> busbar_sf_metadata::Result<DeployResult>;

    async fn list_metadata(
        &self,
        query: &ListQuery,
        as_of_version: Option<&str>,
    ) -> busbar_sf_metadata::Result<ListMetadataResponse>;
}

/// A Metadata API transport for the given org.
///
/// `api_version` overrides the version carried by the credentials.
pub fn connect(
    credentials: &SalesforceCredentials,
    config: &ClientConfig,
    api_version: Option<&str>,
) -> crate::Result<Arc<dyn MetadataTransport>> {
    let mut client = MetadataClient::with_config(credentials, config)?;
    if let Some(version) = api_version.filter(|v| !v.is_empty()) {
        client = client.with_api_version(version);
    }
    tracing::debug!(
        instance_url = credentials.instance_url(),
        api_version = client.api_version(),
        "connected metadata transport"
    );
    Ok(Arc::new(client))
}

#[async_trait]
impl MetadataTransport for MetadataClient {
    async fn submit_retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> busbar_sf_metadata::Result<String> {
        self.retrieve(request).await
    }

    async fn check_retrieve(&self, id: &str) -> busbar_sf_metadata::Result<RetrieveResult> {
        self.check_retrieve_status(id, true).await
    }

    async fn submit_deploy(
        &self,
        zip: &[u8],
        options: &DeployOptions,
    ) -> busbar_sf_metadata::Result<String> {
        self.deploy(zip, options).await
    }

    async fn check_deploy(&self, id: &str) -> busbar_sf_metadata::Result<DeployResult> {
        self.check_deploy_status(id, true).await
    }

    async fn list_metadata(
        &self,
        query: &ListQuery,
        as_of_version: Option<&str>,
    ) -> busbar_sf_metadata::Result<ListMetadataResponse> {
        MetadataClient::list_metadata(self, query, as_of_version).await
    }
}
