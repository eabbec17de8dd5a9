//! List metadata operations.

use serde::{Deserialize, Serialize};

use crate::types::FileProperties;

/// A `listMetadata` query.
///
/// The folder is only present for folder-based types (reports, documents,
/// email templates). An empty folder string is treated as absent, so the
/// query never carries an empty `<folder>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub metadata_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl ListQuery {
    pub fn new(metadata_type: impl Into<String>) -> Self {
        Self {
            metadata_type: metadata_type.into(),
            folder: None,
        }
    }

    /// Scope the query to a folder. `None` and `Some("")` leave it unscoped.
    pub fn with_folder(mut self, folder: Option<&str>) -> Self {
        self.folder = folder.filter(|f| !f.is_empty()).map(str::to_string);
        self
    }
}

/// Raw shape of a `listMetadata` response.
///
/// The service answers with nothing, a single record or a sequence of
/// records. Callers normalize with [`ListMetadataResponse::into_vec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMetadataResponse {
    Empty,
    Single(FileProperties),
    Many(Vec<FileProperties>),
}

impl ListMetadataResponse {
    pub(crate) fn from_records(mut records: Vec<FileProperties>) -> Self {
        match records.len() {
            0 => ListMetadataResponse::Empty,
            1 => ListMetadataResponse::Single(records.remove(0)),
            _ => ListMetadataResponse::Many(records),
        }
    }

    /// Flatten into a (possibly empty) vector.
    pub fn into_vec(self) -> Vec<FileProperties> {
        match self {
            ListMetadataResponse::Empty => Vec::new(),
            ListMetadataResponse::Single(record) => vec![record],
            ListMetadataResponse::Many(records) => records,
        }
    }
}
