//! The host process an export runs for.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use structure::{MetsFile, StructureStore};

/// What an export run needs from the process it exports.
pub trait ProcessContext {
    /// Identifier used for journal entries; non-positive ids are not
    /// journalled.
    fn process_id(&self) -> i64;

    /// Value of the process property `name`, if it exists.
    fn property(&self, name: &str) -> Option<String>;

    /// Folder registered under `alias`, if it exists.
    fn image_folder(&self, alias: &str) -> Option<PathBuf>;

    /// Expands process variables in a setting value.
    fn replace_variables(&self, value: &str) -> String {
        value.to_owned()
    }

    /// The process's structural document.
    fn structure_store(&self) -> Option<&dyn StructureStore> {
        None
    }

    /// Directory for intermediate files; a temporary directory is used when
    /// `None`.
    fn staging_directory(&self) -> Option<PathBuf> {
        None
    }
}

impl<C: ProcessContext + ?Sized> ProcessContext for &C {
    fn process_id(&self) -> i64 {
        (**self).process_id()
    }

    fn property(&self, name: &str) -> Option<String> {
        (**self).property(name)
    }

    fn image_folder(&self, alias: &str) -> Option<PathBuf> {
        (**self).image_folder(alias)
    }

    fn replace_variables(&self, value: &str) -> String {
        (**self).replace_variables(value)
    }

    fn structure_store(&self) -> Option<&dyn StructureStore> {
        (**self).structure_store()
    }

    fn staging_directory(&self) -> Option<PathBuf> {
        (**self).staging_directory()
    }
}

/// A [`ProcessContext`] assembled from fixed values.
///
/// Variables are written `{name}` in setting values and replaced verbatim.
#[derive(Clone, Debug, Default)]
pub struct StaticProcess {
    process_id: i64,
    properties: BTreeMap<String, String>,
    folders: BTreeMap<String, PathBuf>,
    variables: BTreeMap<String, String>,
    structure: Option<MetsFile>,
    staging: Option<PathBuf>,
}

impl StaticProcess {
    /// A process with no properties, folders or document.
    #[must_use]
    pub fn new(process_id: i64) -> Self {
        Self {
            process_id,
            ..Self::default()
        }
    }

    /// Sets property `name`.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Registers `path` under `alias`.
    #[must_use]
    pub fn with_image_folder(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.folders.insert(alias.into(), path.into());
        self
    }

    /// Defines variable `{name}`.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Uses the METS document at `path`.
    #[must_use]
    pub fn with_structure(mut self, path: impl Into<PathBuf>) -> Self {
        self.structure = Some(MetsFile::new(path));
        self
    }

    /// Stages intermediate files in `path`.
    #[must_use]
    pub fn with_staging_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging = Some(path.into());
        self
    }
}

impl ProcessContext for StaticProcess {
    fn process_id(&self) -> i64 {
        self.process_id
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn image_folder(&self, alias: &str) -> Option<PathBuf> {
        self.folders.get(alias).cloned()
    }

    fn replace_variables(&self, value: &str) -> String {
        self.variables
            .iter()
            .fold(value.to_owned(), |acc, (name, replacement)| {
                acc.replace(&format!("{{{name}}}"), replacement)
            })
    }

    fn structure_store(&self) -> Option<&dyn StructureStore> {
        self.structure.as_ref().map(|store| store as &dyn StructureStore)
    }

    fn staging_directory(&self) -> Option<PathBuf> {
        self.staging.clone()
    }
}

/// Destination folder for a run: `target`, plus `alias` when subfolders are
/// enabled.
#[must_use]
pub fn destination_folder(target: &str, alias: &str, create_subfolders: bool) -> PathBuf {
    let base = Path::new(target);
    if create_subfolders && !alias.is_empty() {
        base.join(alias)
    } else {
        base.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_replaced_in_braces() {
        let process = StaticProcess::new(7)
            .with_variable("processtitle", "kleiuniv_PPN517154005")
            .with_variable("processid", "7");
        assert_eq!(
            process.replace_variables("/export/{processtitle}/{processid}/{unknown}"),
            "/export/kleiuniv_PPN517154005/7/{unknown}"
        );
    }

    #[test]
    fn lookups_return_registered_values() {
        let process = StaticProcess::new(1)
            .with_property("selected", "{}")
            .with_image_folder("media", "/data/1/images/media");
        assert_eq!(process.property("selected").as_deref(), Some("{}"));
        assert_eq!(process.property("other"), None);
        assert_eq!(
            process.image_folder("media").as_deref(),
            Some(Path::new("/data/1/images/media"))
        );
        assert!(process.structure_store().is_none());
    }

    #[test]
    fn subfolder_is_appended_only_when_enabled() {
        assert_eq!(destination_folder("/t", "media", true), Path::new("/t/media"));
        assert_eq!(destination_folder("/t", "media", false), Path::new("/t"));
    }
}
