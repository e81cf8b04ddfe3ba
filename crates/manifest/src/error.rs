use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure building or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A file timestamp could not be read.
    #[error("failed to read timestamp of '{}': {source}", path.display())]
    Timestamp {
        /// The image file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Field-name overrides were contradictory.
    #[error("invalid manifest field names: {0}")]
    FieldNames(#[source] serde_json::Error),
    /// JSON rendering failed.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The manifest file could not be written.
    #[error("failed to write manifest '{}': {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
