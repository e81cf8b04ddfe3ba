//! Loading and saving structural documents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::mets::{parse_mets, write_mets};
use crate::{MetsError, StructuralDocument};

/// Source and sink of a process's structural document.
pub trait StructureStore {
    /// Reads the current document.
    fn load(&self) -> Result<StructuralDocument, MetsError>;

    /// Writes `document` to `destination` without touching the stored copy.
    fn save_as(&self, document: &StructuralDocument, destination: &Path) -> Result<(), MetsError>;
}

/// A METS document on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetsFile {
    path: PathBuf,
}

impl MetsFile {
    /// Uses the METS document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the stored document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StructureStore for MetsFile {
    fn load(&self) -> Result<StructuralDocument, MetsError> {
        let content = fs::read_to_string(&self.path).map_err(|source| MetsError::Io {
            action: "read",
            path: self.path.clone(),
            source,
        })?;
        parse_mets(&content)
    }

    fn save_as(&self, document: &StructuralDocument, destination: &Path) -> Result<(), MetsError> {
        fs::write(destination, write_mets(document)).map_err(|source| MetsError::Io {
            action: "write",
            path: destination.to_path_buf(),
            source,
        })
    }
}

impl<S: StructureStore + ?Sized> StructureStore for &S {
    fn load(&self) -> Result<StructuralDocument, MetsError> {
        (**self).load()
    }

    fn save_as(&self, document: &StructuralDocument, destination: &Path) -> Result<(), MetsError> {
        (**self).save_as(document, destination)
    }
}
