//! Per-image manifest records.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, Utc};

use crate::ManifestError;

/// Which file timestamp supplies the creation date.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TimestampSource {
    /// Birth time, falling back to modification time where unavailable.
    #[default]
    Created,
    /// Modification time.
    Modified,
}

impl TimestampSource {
    /// Configuration token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised [`TimestampSource`] token.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown timestamp source '{0}', expected 'created' or 'modified'")]
pub struct ParseTimestampSourceError(String);

impl FromStr for TimestampSource {
    type Err = ParseTimestampSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "creation" => Ok(Self::Created),
            "modified" | "modification" => Ok(Self::Modified),
            _ => Err(ParseTimestampSourceError(s.to_owned())),
        }
    }
}

/// Properties of one exported image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageRecord {
    /// File stem.
    pub id: String,
    /// File name.
    pub title: String,
    /// Alternative text, the file name.
    pub alt_text: String,
    /// Whether the image is a symbol image.
    pub is_symbol: bool,
    /// Format token such as `jpeg`.
    pub media_type: String,
    /// Calendar date the image was taken or stored.
    pub creation_date: NaiveDate,
    /// Whether the image is under the institution's copyright.
    pub is_copyright: bool,
    /// Tooltip text, the file name.
    pub file_info: String,
    /// Whether the image may be published.
    pub is_publishable: bool,
    /// Information carried over from a previous system.
    pub migrated_info: Option<String>,
}

impl ImageRecord {
    /// Derives a record from a file name and its date.
    #[must_use]
    pub fn new(file_name: &str, creation_date: NaiveDate) -> Self {
        let id = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name)
            .to_owned();
        Self {
            id,
            title: file_name.to_owned(),
            alt_text: file_name.to_owned(),
            is_symbol: true,
            media_type: media_type_for(file_name),
            creation_date,
            is_copyright: true,
            file_info: file_name.to_owned(),
            is_publishable: true,
            migrated_info: None,
        }
    }

    /// Derives a record from the file at `path`, dated by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Timestamp`] when the file's metadata cannot be
    /// read.
    pub fn from_file(path: &Path, source: TimestampSource) -> Result<Self, ManifestError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(&name, file_date(path, source)?))
    }
}

/// Calendar date (UTC) of the chosen timestamp of `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Timestamp`] when metadata is unavailable.
pub fn file_date(path: &Path, source: TimestampSource) -> Result<NaiveDate, ManifestError> {
    let timestamp_error = |error| ManifestError::Timestamp {
        path: path.to_path_buf(),
        source: error,
    };
    let metadata = fs::metadata(path).map_err(timestamp_error)?;
    let time: SystemTime = match source {
        TimestampSource::Created => match metadata.created() {
            Ok(created) => created,
            Err(error) => {
                tracing::debug!(
                    target: "export::manifest",
                    path = %path.display(),
                    %error,
                    "birth time unavailable, using modification time"
                );
                metadata.modified().map_err(timestamp_error)?
            }
        },
        TimestampSource::Modified => metadata.modified().map_err(timestamp_error)?,
    };
    Ok(DateTime::<Utc>::from(time).date_naive())
}

/// Image format token for `file_name`, derived from its extension.
#[must_use]
pub fn media_type_for(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "jpeg".to_owned(),
        "tif" | "tiff" => "tiff".to_owned(),
        _ => extension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields_derive_from_file_name() {
        let date = NaiveDate::from_ymd_opt(2022, 11, 1).unwrap();
        let record = ImageRecord::new("00000018.JPG", date);
        assert_eq!(record.id, "00000018");
        assert_eq!(record.title, "00000018.JPG");
        assert_eq!(record.alt_text, record.file_info);
        assert_eq!(record.media_type, "jpeg");
        assert!(record.is_symbol && record.is_copyright && record.is_publishable);
        assert_eq!(record.migrated_info, None);
    }

    #[test]
    fn media_types_follow_extension() {
        assert_eq!(media_type_for("a.tif"), "tiff");
        assert_eq!(media_type_for("a.TIFF"), "tiff");
        assert_eq!(media_type_for("a.png"), "png");
        assert_eq!(media_type_for("a.jp2"), "jp2");
        assert_eq!(media_type_for("noext"), "");
    }

    #[test]
    fn timestamp_source_parses_tokens() {
        assert_eq!("Modified".parse::<TimestampSource>(), Ok(TimestampSource::Modified));
        assert_eq!(" created ".parse::<TimestampSource>(), Ok(TimestampSource::Created));
        assert!("accessed".parse::<TimestampSource>().is_err());
    }

    #[test]
    fn modification_date_is_truncated_to_the_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_667_294_396, 0);
        filetime::set_file_mtime(&path, mtime).unwrap();

        let date = file_date(&path, TimestampSource::Modified).unwrap();
        assert_eq!(date.to_string(), "2022-11-01");
    }

    #[test]
    fn missing_file_has_no_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_date(&dir.path().join("gone.jpg"), TimestampSource::Created).unwrap_err();
        assert!(matches!(err, ManifestError::Timestamp { .. }));
    }
}
