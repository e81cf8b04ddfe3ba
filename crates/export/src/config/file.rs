//! Settings file parsing.
//!
//! The file holds global parameters followed by per-project sections:
//!
//! ```ini
//! # applies to every project
//! sourceFolder = media
//! targetFolder = /opt/export/{processtitle}
//!
//! [*]
//! exportJSON = yes
//!
//! [Archive]
//! useScp = yes
//! scpHostname = archive.example
//! ```
//!
//! A project's settings are the global parameters overlaid by its own
//! section, or by the `[*]` section when it has none.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::ExportSettings;
use crate::ConfigError;

/// Name of the section used for projects without their own.
pub const WILDCARD_SECTION: &str = "*";

#[derive(Clone, Debug, Eq, PartialEq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// A parsed settings file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettingsFile {
    path: PathBuf,
    global: Vec<(String, String)>,
    sections: Vec<Section>,
}

impl SettingsFile {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses `input`; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed headers, duplicate
    /// sections and lines without `=`.
    pub fn parse(input: &str, path: &Path) -> Result<Self, ConfigError> {
        let parse_error = |line: usize, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut global = Vec::new();
        let mut sections: Vec<Section> = Vec::new();
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();

        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let end = header
                    .find(']')
                    .ok_or_else(|| parse_error(line_number, "unterminated section header".into()))?;
                let name = header[..end].trim();
                if name.is_empty() {
                    return Err(parse_error(line_number, "section name must be non-empty".into()));
                }
                let trailing = header[end + 1..].trim();
                if !trailing.is_empty() && !trailing.starts_with('#') && !trailing.starts_with(';') {
                    return Err(parse_error(
                        line_number,
                        "unexpected content after section header".into(),
                    ));
                }
                if let Some(previous) = seen.insert(name.to_owned(), line_number) {
                    return Err(parse_error(
                        line_number,
                        format!("duplicate section '{name}' (previously defined at line {previous})"),
                    ));
                }
                sections.push(Section {
                    name: name.to_owned(),
                    entries: Vec::new(),
                });
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_error(line_number, "expected 'key = value' format".into()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(parse_error(line_number, "missing key before '='".into()));
            }
            let entry = (key.to_owned(), value.trim().to_owned());
            match sections.last_mut() {
                Some(section) => section.entries.push(entry),
                None => global.push(entry),
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            global,
            sections,
        })
    }

    /// The file this was parsed from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Section names in file order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.name.as_str())
    }

    /// Key/value pairs that apply to `project`, later pairs overriding
    /// earlier ones.
    #[must_use]
    pub fn settings_for(&self, project: &str) -> Vec<(String, String)> {
        let section = self
            .sections
            .iter()
            .find(|section| section.name == project)
            .or_else(|| self.sections.iter().find(|section| section.name == WILDCARD_SECTION));

        let mut pairs = self.global.clone();
        if let Some(section) = section {
            tracing::debug!(
                target: "export::run",
                project,
                section = %section.name,
                "using settings section"
            );
            pairs.extend(section.entries.iter().cloned());
        }
        pairs
    }

    /// Typed settings for `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] or [`ConfigError::FieldNames`]
    /// from [`ExportSettings::from_pairs`].
    pub fn export_settings_for(&self, project: &str) -> Result<ExportSettings, ConfigError> {
        ExportSettings::from_pairs(self.settings_for(project))
    }
}
