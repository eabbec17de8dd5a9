use busbar_sf_client::security::xml;
use tracing::instrument;

use super::xml_helpers;
use crate::error::Result;
use crate::retrieve::{RetrieveRequest, RetrieveResult};

impl super::MetadataClient {
    /// Start a retrieve operation.
    ///
    /// Returns the async process ID. Manifest members and package names are
    /// XML-escaped before they reach the envelope.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use busbar_sf_metadata::{MetadataClient, PackageManifest, RetrieveRequest};
    ///
    /// let request = RetrieveRequest {
    ///     unpackaged: Some(
    ///         PackageManifest::new("62.0").add_type("ApexClass", vec!["*".to_string()]),
    ///     ),
    ///     package_names: vec![],
    /// };
    /// let async_id = client.retrieve(&request).await?;
    /// ```
    #[instrument(skip(self, request), fields(packages = request.package_names.len()))]
    pub async fn retrieve(&self, request: &RetrieveRequest) -> Result<String> {
        let package_names_xml: String = request
            .package_names
            .iter()
            .map(|name| format!("\n        <packageNames>{}</packageNames>", xml::escape(name)))
            .collect();

        let unpackaged_xml = request
            .unpackaged
            .as_ref()
            .map(|manifest| {
                format!(
                    "\n        <unpackaged>\n        {}\n        </unpackaged>",
                    manifest.to_xml()
                )
            })
            .unwrap_or_default();

        let body = format!(
            r#"<retrieve xmlns="http://soap.sforce.com/2006/04/metadata">
      <retrieveRequest>
        <apiVersion>{api_version}</apiVersion>{package_names}
        <singlePackage>{single_package}</singlePackage>{unpackaged}
      </retrieveRequest>
    </retrieve>"#,
            api_version = xml::escape(&self.api_version),
            package_names = package_names_xml,
            single_package = request.single_package(),
            unpackaged = unpackaged_xml,
        );

        let response = self.call("retrieve", &body).await?;
        xml_helpers::parse_async_id(&response, "retrieve")
    }

    /// Check the status of a retrieve operation.
    #[instrument(skip(self))]
    pub async fn check_retrieve_status(
        &self,
        async_process_id: &str,
        include_zip: bool,
    ) -> Result<RetrieveResult> {
        let body = format!(
            r#"<checkRetrieveStatus xmlns="http://soap.sforce.com/2006/04/metadata">
      <asyncProcessId>{process_id}</asyncProcessId>
      <includeZip>{include_zip}</includeZip>
    </checkRetrieveStatus>"#,
            process_id = xml::escape(async_process_id),
            include_zip = include_zip,
        );

        let response = self.call("checkRetrieveStatus", &body).await?;
        xml_helpers::parse_retrieve_result(&response)
    }
}
