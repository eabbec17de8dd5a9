//! Listing remote metadata of one type.

use std::sync::Arc;

use busbar_sf_metadata::{FileProperties, ListQuery};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::transport::MetadataTransport;

/// Issues one `listMetadata` query and always answers with a vector.
#[derive(Clone)]
pub struct MetadataLister {
    transport: Arc<dyn MetadataTransport>,
}

impl MetadataLister {
    pub fn new(transport: Arc<dyn MetadataTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        metadata_type: &str,
        folder: Option<&str>,
        api_version: Option<&str>,
    ) -> Result<Vec<FileProperties>> {
        let query = ListQuery::new(metadata_type).with_folder(folder);
        let api_version = api_version.filter(|v| !v.is_empty());
        let records = self
            .transport
            .list_metadata(&query, api_version)
            .await?
            .into_vec();
        debug!(count = records.len(), "listed metadata");
        Ok(records)
    }
}
