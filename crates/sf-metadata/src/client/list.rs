use busbar_sf_client::security::xml;
use tracing::instrument;

use super::xml_helpers;
use crate::error::Result;
use crate::list::{ListMetadataResponse, ListQuery};

impl super::MetadataClient {
    /// List remote metadata matching one query.
    ///
    /// `as_of_version` defaults to the client's API version.
    #[instrument(skip(self), fields(metadata_type = %query.metadata_type))]
    pub async fn list_metadata(
        &self,
        query: &ListQuery,
        as_of_version: Option<&str>,
    ) -> Result<ListMetadataResponse> {
        let folder_xml = query
            .folder
            .as_deref()
            .map(|f| format!("\n        <folder>{}</folder>", xml::escape(f)))
            .unwrap_or_default();

        let body = format!(
            r#"<listMetadata xmlns="http://soap.sforce.com/2006/04/metadata">
      <queries>{folder}
        <type>{metadata_type}</type>
      </queries>
      <asOfVersion>{version}</asOfVersion>
    </listMetadata>"#,
            folder = folder_xml,
            metadata_type = xml::escape(&query.metadata_type),
            version = xml::escape(as_of_version.unwrap_or(&self.api_version)),
        );

        let response = self.call("listMetadata", &body).await?;
        Ok(xml_helpers::parse_list_metadata(&response))
    }
}
