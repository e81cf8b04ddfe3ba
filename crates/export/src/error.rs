//! Error types for configuration and export runs.

use std::io;
use std::path::PathBuf;

use manifest::ManifestError;
use selection::{DecodeError, ResolveError};
use structure::{MetsError, StructuralInconsistencyError};
use thiserror::Error;
use transport::TransferError;

/// Failure reading or validating export settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// Settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The settings file is syntactically invalid.
    #[error("{}: line {line}: {message}", path.display())]
    Parse {
        /// Settings file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        message: String,
    },
    /// A setting has a value of the wrong shape.
    #[error("invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        /// Key as written.
        key: String,
        /// Offending value.
        value: String,
        /// Description of accepted values.
        expected: &'static str,
    },
    /// Required settings are blank.
    #[error("missing required settings: {}", keys.join(", "))]
    MissingSettings {
        /// Every blank required key.
        keys: Vec<&'static str>,
    },
    /// Manifest field-name overrides contradict each other.
    #[error(transparent)]
    FieldNames(ManifestError),
}

/// Failure in one step of an export run.
///
/// Runs do not return this type; each failure is reported and folded into the
/// run's outcome.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Settings are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The stored selection could not be decoded.
    #[error("cannot decode selection: {0}")]
    Selection(#[from] DecodeError),
    /// The source folder could not be listed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Delivery failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// The manifest could not be built or written.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// The structural document is inconsistent.
    #[error(transparent)]
    Structure(#[from] StructuralInconsistencyError),
    /// The structural document could not be read or written.
    #[error(transparent)]
    Mets(#[from] MetsError),
    /// The process has no structural document.
    #[error("no structural document is available for this process")]
    NoStructure,
    /// A staging directory could not be created.
    #[error("failed to create staging directory: {0}")]
    Staging(#[source] io::Error),
    /// SCP delivery was requested but the SSH client is not compiled in.
    #[error("SCP delivery requires the embedded-ssh feature")]
    ScpUnavailable,
}
