use std::fs;
use std::path::Path;

use crate::{TransferError, Transport};

/// Delivers by copying within the local filesystem.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LocalTransport;

impl LocalTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for LocalTransport {
    fn describe(&self) -> String {
        "local".to_owned()
    }

    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError> {
        fs::create_dir_all(directory)
            .map_err(|source| TransferError::io("create directory", directory, source))
    }

    fn send_file(
        &mut self,
        source: &Path,
        directory: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        let target = directory.join(name);
        let bytes = fs::copy(source, &target)
            .map_err(|err| TransferError::io("copy", source, err))?;
        tracing::debug!(
            target: "export::transport",
            source = %source.display(),
            target = %target.display(),
            bytes,
            "copied file"
        );
        Ok(())
    }
}
