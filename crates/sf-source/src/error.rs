//! Error types for sf-source.

use crate::operation::OperationHandle;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The in-progress handle carried by a timeout, if this is one.
    pub fn timed_out_handle(&self) -> Option<&OperationHandle> {
        match &self.kind {
            ErrorKind::Timeout { handle, .. } => Some(handle),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("The flags {} can't be used together. Specify only one of them.", .flags.join(", "))]
    ConflictingInput { flags: Vec<&'static str> },

    #[error("Provide one of the following flags: {}", .flags.join(", "))]
    NoInput { flags: Vec<&'static str> },

    #[error("Invalid wait: {0}")]
    InvalidWait(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("{0}")]
    Build(String),

    #[error("The {event} hook failed: {message}")]
    Hook { event: String, message: String },

    #[error("Metadata API error: {0}")]
    Remote(String),

    #[error(
        "The {} operation {} timed out after {} minute(s). It is still running in the org; re-run with a larger --wait value.",
        .handle.kind, .handle.id, .minutes
    )]
    Timeout {
        minutes: u64,
        handle: Box<OperationHandle>,
    },

    #[error("Target org error: {0}")]
    Org(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<busbar_sf_metadata::Error> for Error {
    fn from(err: busbar_sf_metadata::Error) -> Self {
        Error::with_source(ErrorKind::Remote(err.to_string()), err)
    }
}

impl From<busbar_sf_auth::Error> for Error {
    fn from(err: busbar_sf_auth::Error) -> Self {
        Error::with_source(ErrorKind::Org(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::with_source(ErrorKind::Archive(err.to_string()), err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::with_source(ErrorKind::Archive(err.to_string()), err)
    }
}
