use std::path::PathBuf;
use std::sync::Arc;

use busbar_sf_metadata::FileProperties;
use tracing::instrument;

use crate::error::Result;
use crate::lister::MetadataLister;
use crate::output::write_result_file;
use crate::transport::MetadataTransport;

/// Flags of one `list` invocation.
#[derive(Debug, Clone, Default)]
pub struct ListCommand {
    pub metadata_type: String,
    pub folder: Option<String>,
    pub api_version: Option<String>,
    pub result_file: Option<PathBuf>,
}

/// Records listed, plus the message that replaces normal output when a
/// result file was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReport {
    pub records: Vec<FileProperties>,
    pub result_file_message: Option<String>,
}

#[instrument(skip(transport), fields(metadata_type = %command.metadata_type))]
pub async fn list(
    transport: Arc<dyn MetadataTransport>,
    command: &ListCommand,
) -> Result<ListReport> {
    let records = MetadataLister::new(transport)
        .list(
            &command.metadata_type,
            command.folder.as_deref(),
            command.api_version.as_deref(),
        )
        .await?;

    let result_file_message = match &command.result_file {
        Some(path) => Some(write_result_file(path, &records)?),
        None => None,
    };

    Ok(ListReport {
        records,
        result_file_message,
    })
}
