//! Sequencing of one export run.

use std::path::{Path, PathBuf};

use logging::{Journal, Reporter};
use manifest::{MANIFEST_FILE_NAME, build_manifest};
use selection::{Resolution, SelectionMap, decode_selection, list_source_folder, resolve_images};
use structure::{PruneOptions, prune};
use tempfile::TempDir;
use transport::{Delivery, LocalTransport, Transport, deliver_all};

use crate::context::destination_folder;
use crate::{ExportError, ExportSettings, ProcessContext};

/// File name of the pruned structural document at the destination.
pub const METS_FILE_NAME: &str = "mets.xml";

/// File name of the pruned structural document while staged.
pub const STAGED_METS_FILE_NAME: &str = "selected_mets.xml";

/// Result of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExportOutcome {
    /// True when every enabled artifact was exported.
    pub success: bool,
    /// Reported warnings and errors, in order.
    pub problems: Vec<String>,
    /// Folder the run delivered into, once known.
    pub destination: Option<PathBuf>,
    /// Image names delivered.
    pub exported: Vec<String>,
}

/// Runs exports with fixed settings.
#[derive(Clone, Debug)]
pub struct ExportOrchestrator {
    settings: ExportSettings,
}

enum Staging {
    Provided(PathBuf),
    Temporary(TempDir),
}

impl Staging {
    fn path(&self) -> &Path {
        match self {
            Self::Provided(path) => path,
            Self::Temporary(dir) => dir.path(),
        }
    }
}

impl ExportOrchestrator {
    /// Uses `settings` for every run.
    #[must_use]
    pub const fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Exports the selected images of `context`, connecting the transport the
    /// settings ask for.
    pub fn run<C, J>(&self, context: &C, journal: J) -> ExportOutcome
    where
        C: ProcessContext + ?Sized,
        J: Journal,
    {
        let mut reporter = Reporter::new(context.process_id(), journal);
        let mut outcome = ExportOutcome::default();

        if let Err(error) = self.settings.validate() {
            reporter.error(&format!("Configuration is incomplete: {error}"));
            return finish(outcome, reporter);
        }
        let mut transport = match open_transport(&self.settings) {
            Ok(transport) => transport,
            Err(error) => {
                reporter.error(&format!("Cannot open the transport: {error}"));
                return finish(outcome, reporter);
            }
        };

        let success = self.execute(context, &mut reporter, &mut transport, &mut outcome);
        drop(transport);
        outcome.success = success;
        finish(outcome, reporter)
    }

    /// Like [`run`](Self::run), delivering through `transport`.
    pub fn run_with_transport<C, J, T>(
        &self,
        context: &C,
        journal: J,
        transport: &mut T,
    ) -> ExportOutcome
    where
        C: ProcessContext + ?Sized,
        J: Journal,
        T: Transport + ?Sized,
    {
        let mut reporter = Reporter::new(context.process_id(), journal);
        let mut outcome = ExportOutcome::default();

        if let Err(error) = self.settings.validate() {
            reporter.error(&format!("Configuration is incomplete: {error}"));
            return finish(outcome, reporter);
        }
        let success = self.execute(context, &mut reporter, transport, &mut outcome);
        outcome.success = success;
        finish(outcome, reporter)
    }

    fn execute<C, J, T>(
        &self,
        context: &C,
        reporter: &mut Reporter<J>,
        transport: &mut T,
        outcome: &mut ExportOutcome,
    ) -> bool
    where
        C: ProcessContext + ?Sized,
        J: Journal,
        T: Transport + ?Sized,
    {
        let settings = &self.settings;
        let property_name = context.replace_variables(&settings.property_name);
        let target = context.replace_variables(&settings.target_folder);
        let destination =
            destination_folder(&target, &settings.source_folder, settings.create_subfolders);
        tracing::debug!(
            target: "export::run",
            property = %property_name,
            source_folder = %settings.source_folder,
            destination = %destination.display(),
            via = %transport.describe(),
            manifest = settings.export_manifest,
            structure = settings.export_structure,
            "starting export"
        );
        outcome.destination = Some(destination.clone());

        let Some(selection) = read_selection(context, reporter, &property_name) else {
            return false;
        };
        if selection.is_empty() {
            reporter.abort("No image is selected, aborting.");
            return false;
        }

        let Some(resolution) = self.resolve(context, reporter, &selection) else {
            return false;
        };

        let deliveries = resolution
            .images()
            .iter()
            .map(|image| Delivery::new(image.source_path(), image.name()));
        let report = match deliver_all(transport, &destination, deliveries) {
            Ok(report) => report,
            Err(error) => {
                reporter.error(&format!(
                    "Failed to create the target folder {}: {error}",
                    destination.display()
                ));
                return false;
            }
        };
        for failure in &report.failed {
            reporter.error(&format!(
                "Failed to export image {}: {}",
                failure.name, failure.error
            ));
        }
        let mut success = report.is_success();
        outcome.exported = report.delivered;

        if !settings.export_manifest && !settings.export_structure {
            return success;
        }
        let staging = match staging_for(context) {
            Ok(staging) => staging,
            Err(error) => {
                reporter.error(&error.to_string());
                return false;
            }
        };

        if settings.export_manifest
            && let Err(error) =
                self.export_manifest(&resolution, staging.path(), transport, &destination)
        {
            reporter.error(&format!("Failed to export the JSON file: {error}"));
            success = false;
        }
        if settings.export_structure
            && let Err(error) = self.export_structure(
                context,
                &selection,
                staging.path(),
                transport,
                &destination,
            )
        {
            reporter.error(&format!("Failed to export the METS file: {error}"));
            success = false;
        }
        success
    }

    fn resolve<C, J>(
        &self,
        context: &C,
        reporter: &mut Reporter<J>,
        selection: &SelectionMap,
    ) -> Option<Resolution>
    where
        C: ProcessContext + ?Sized,
        J: Journal,
    {
        let alias = &self.settings.source_folder;
        let Some(folder) = context.image_folder(alias).filter(|folder| folder.is_dir()) else {
            reporter.abort(&format!(
                "The folder configured as '{alias}' does not exist yet. Aborting."
            ));
            return None;
        };
        let mut listing = match list_source_folder(&folder) {
            Ok(listing) => listing,
            Err(error) => {
                reporter.error(&error.to_string());
                return None;
            }
        };
        listing.sort_unstable();
        let resolution = resolve_images(selection, &folder, listing);
        for name in resolution.missing() {
            reporter.warning(&format!("Selected image {name} is missing from '{alias}'."));
        }
        if resolution.is_empty() {
            reporter.abort("None of the selected images exist, aborting.");
            return None;
        }
        Some(resolution)
    }

    fn export_manifest<T: Transport + ?Sized>(
        &self,
        resolution: &Resolution,
        staging: &Path,
        transport: &mut T,
        destination: &Path,
    ) -> Result<(), ExportError> {
        let manifest = build_manifest(resolution.images(), self.settings.manifest.clone())?;
        let staged = manifest.write_to(staging)?;
        transport.send_file(&staged, destination, MANIFEST_FILE_NAME)?;
        tracing::info!(
            target: "export::manifest",
            records = manifest.record_count(),
            destination = %destination.display(),
            "manifest exported"
        );
        Ok(())
    }

    fn export_structure<C, T>(
        &self,
        context: &C,
        selection: &SelectionMap,
        staging: &Path,
        transport: &mut T,
        destination: &Path,
    ) -> Result<(), ExportError>
    where
        C: ProcessContext + ?Sized,
        T: Transport + ?Sized,
    {
        let store = context.structure_store().ok_or(ExportError::NoStructure)?;
        let mut document = store.load()?;
        let report = prune(
            &mut document,
            selection,
            &PruneOptions::new(self.settings.page_order_field.as_str()),
        )?;
        let staged = staging.join(STAGED_METS_FILE_NAME);
        store.save_as(&document, &staged)?;
        transport.send_file(&staged, destination, METS_FILE_NAME)?;
        tracing::info!(
            target: "export::structure",
            retained = report.retained,
            removed = report.removed_nodes.len(),
            destination = %destination.display(),
            "structural document exported"
        );
        Ok(())
    }
}

fn read_selection<C, J>(
    context: &C,
    reporter: &mut Reporter<J>,
    property: &str,
) -> Option<SelectionMap>
where
    C: ProcessContext + ?Sized,
    J: Journal,
{
    let Some(value) = context.property(property) else {
        reporter.abort(&format!(
            "Can not find the process property '{property}'. Please recheck your configuration."
        ));
        return Some(SelectionMap::new());
    };
    match decode_selection(&value) {
        Ok(selection) => Some(selection),
        Err(error) => {
            reporter.error(&ExportError::from(error).to_string());
            None
        }
    }
}

fn staging_for<C: ProcessContext + ?Sized>(context: &C) -> Result<Staging, ExportError> {
    match context.staging_directory() {
        Some(path) => Ok(Staging::Provided(path)),
        None => TempDir::new().map(Staging::Temporary).map_err(ExportError::Staging),
    }
}

/// Opens the transport the settings ask for.
///
/// # Errors
///
/// Returns [`ExportError::Config`] when SSH parameters are incomplete,
/// [`ExportError::Transfer`] when the session cannot be established and
/// [`ExportError::ScpUnavailable`] when SCP support is not compiled in.
pub fn open_transport(settings: &ExportSettings) -> Result<Box<dyn Transport>, ExportError> {
    if settings.use_scp {
        open_scp(settings)
    } else {
        Ok(Box::new(LocalTransport::new()))
    }
}

#[cfg(feature = "embedded-ssh")]
fn open_scp(settings: &ExportSettings) -> Result<Box<dyn Transport>, ExportError> {
    let config = settings.scp.ssh_config()?;
    let session = transport::SshSession::connect(&config)?;
    Ok(Box::new(transport::ScpTransport::new(session)))
}

#[cfg(not(feature = "embedded-ssh"))]
fn open_scp(_settings: &ExportSettings) -> Result<Box<dyn Transport>, ExportError> {
    Err(ExportError::ScpUnavailable)
}

fn finish<J: Journal>(mut outcome: ExportOutcome, reporter: Reporter<J>) -> ExportOutcome {
    let process_id = reporter.process_id();
    outcome.problems = reporter.into_problems();
    if outcome.success {
        tracing::info!(target: "export::run", process_id, "export executed");
    } else {
        tracing::error!(
            target: "export::run",
            process_id,
            problems = outcome.problems.len(),
            "export aborted"
        );
    }
    outcome
}

#[cfg(test)]
mod tests;
