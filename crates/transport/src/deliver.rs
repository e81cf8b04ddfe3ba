use std::path::{Path, PathBuf};

use crate::TransferError;

/// Moves files into a destination directory.
pub trait Transport {
    /// Short description for log lines.
    fn describe(&self) -> String;

    /// Creates `directory` and any missing parents. Existing directories are
    /// not an error.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created.
    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError>;

    /// Places the content of `source` at `directory/name`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be read or the destination written.
    fn send_file(&mut self, source: &Path, directory: &Path, name: &str)
    -> Result<(), TransferError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError> {
        (**self).create_directory(directory)
    }

    fn send_file(
        &mut self,
        source: &Path,
        directory: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        (**self).send_file(source, directory, name)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError> {
        (**self).create_directory(directory)
    }

    fn send_file(
        &mut self,
        source: &Path,
        directory: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        (**self).send_file(source, directory, name)
    }
}

/// One file to deliver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delivery {
    /// Where the content is read from.
    pub source: PathBuf,
    /// File name at the destination.
    pub name: String,
}

impl Delivery {
    /// Delivers `source` under `name`.
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// A file that could not be delivered.
#[derive(Debug)]
pub struct FailedDelivery {
    /// Destination file name.
    pub name: String,
    /// Why it failed.
    pub error: TransferError,
}

/// Outcome of [`deliver_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names delivered, in attempt order.
    pub delivered: Vec<String>,
    /// Failures, in attempt order.
    pub failed: Vec<FailedDelivery>,
}

impl BatchReport {
    /// True when nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Creates `directory`, then delivers every file into it.
///
/// A failing file is recorded and the rest are still attempted.
///
/// # Errors
///
/// Returns the error when the directory cannot be created; no file is
/// attempted in that case.
pub fn deliver_all<T, I>(
    transport: &mut T,
    directory: &Path,
    files: I,
) -> Result<BatchReport, TransferError>
where
    T: Transport + ?Sized,
    I: IntoIterator<Item = Delivery>,
{
    transport.create_directory(directory)?;

    let mut report = BatchReport::default();
    for delivery in files {
        match transport.send_file(&delivery.source, directory, &delivery.name) {
            Ok(()) => report.delivered.push(delivery.name),
            Err(error) => {
                tracing::warn!(
                    target: "export::transport",
                    name = %delivery.name,
                    %error,
                    "delivery failed"
                );
                report.failed.push(FailedDelivery {
                    name: delivery.name,
                    error,
                });
            }
        }
    }

    tracing::info!(
        target: "export::transport",
        via = %transport.describe(),
        directory = %directory.display(),
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        "batch delivered"
    );
    Ok(report)
}
