use std::path::PathBuf;

use stager_metadata::MetadataError;
use stager_registry::FetchError;
use thiserror::Error;

pub type Result<T, E = StagerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StagerError {
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// The group metadata could not be retrieved. Callers may opt into
    /// treating this as "nothing published yet".
    #[error("metadata unavailable at {url}")]
    MetadataUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("malformed metadata at {url}")]
    MalformedMetadata {
        url: String,
        #[source]
        source: MetadataError,
    },

    #[error("malformed project description in {origin}: {source}")]
    MalformedDescription {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to render POM: {0}")]
    Render(#[from] quick_xml::SeError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StagerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
