//! Assembling and writing the manifest document.

use std::fs;
use std::path::{Path, PathBuf};

use selection::{MAX_ORDER, ResolvedImage};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::fields::RenderedFlag;
use crate::{
    FlagStyles, FlagTokens, ImageRecord, ManifestError, ManifestFieldNames, TimestampSource,
};

/// File name of the written manifest.
pub const MANIFEST_FILE_NAME: &str = "selected.json";

/// Everything that shapes a manifest besides its records.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ManifestOptions {
    /// Output keys.
    pub fields: ManifestFieldNames,
    /// Strings for flags written as tokens.
    pub tokens: FlagTokens,
    /// Whether each flag is written as a boolean or a token.
    pub flag_styles: FlagStyles,
    /// Value written under the collection identifier key.
    pub collection_id: i64,
    /// Timestamp used for creation dates.
    pub timestamp_source: TimestampSource,
}

/// Places records into their selected positions.
///
/// Position `n` lands in slot `n - 1`; the slot list grows to the highest
/// position seen and unfilled slots serialise as `null`.
#[derive(Clone, Debug)]
pub struct ManifestBuilder {
    options: ManifestOptions,
    slots: Vec<Option<ImageRecord>>,
}

impl ManifestBuilder {
    /// Starts an empty manifest.
    #[must_use]
    pub const fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            slots: Vec::new(),
        }
    }

    /// Puts `record` at 1-based `order`, returning any record it replaced.
    /// Order `0` and orders above [`MAX_ORDER`] have no slot and are ignored.
    pub fn insert(&mut self, order: u32, record: ImageRecord) -> Option<ImageRecord> {
        if order > MAX_ORDER {
            tracing::warn!(
                target: "export::manifest",
                id = %record.id,
                order,
                "ignoring record beyond the highest position"
            );
            return None;
        }
        let Some(index) = (order as usize).checked_sub(1) else {
            tracing::warn!(target: "export::manifest", id = %record.id, "ignoring record without position");
            return None;
        };
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index].replace(record)
    }

    /// Reads `image`'s file and inserts its record at the image's order.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Timestamp`] when the file cannot be inspected.
    pub fn add_image(&mut self, image: &ResolvedImage) -> Result<(), ManifestError> {
        let record = ImageRecord::from_file(image.source_path(), self.options.timestamp_source)?;
        self.insert(image.order(), record);
        Ok(())
    }

    /// Finishes the manifest.
    #[must_use]
    pub fn build(self) -> Manifest {
        Manifest {
            options: self.options,
            slots: self.slots,
        }
    }
}

/// Builds the manifest for `images`.
///
/// # Errors
///
/// Returns the first [`ManifestError::Timestamp`] encountered.
pub fn build_manifest<'a, I>(images: I, options: ManifestOptions) -> Result<Manifest, ManifestError>
where
    I: IntoIterator<Item = &'a ResolvedImage>,
{
    let mut builder = ManifestBuilder::new(options);
    for image in images {
        builder.add_image(image)?;
    }
    Ok(builder.build())
}

/// A finished manifest.
#[derive(Clone, Debug)]
pub struct Manifest {
    options: ManifestOptions,
    slots: Vec<Option<ImageRecord>>,
}

impl Manifest {
    /// Slots in position order.
    #[must_use]
    pub fn slots(&self) -> &[Option<ImageRecord>] {
        &self.slots
    }

    /// Number of filled slots.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if rendering fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    /// Writes [`MANIFEST_FILE_NAME`] into `directory` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Write`] when the file cannot be written.
    pub fn write_to(&self, directory: &Path) -> Result<PathBuf, ManifestError> {
        let path = directory.join(MANIFEST_FILE_NAME);
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(&path, json).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(
            target: "export::manifest",
            path = %path.display(),
            slots = self.slots.len(),
            records = self.record_count(),
            "manifest written"
        );
        Ok(path)
    }
}

impl Serialize for Manifest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(
            &self.options.fields.images,
            &Slots {
                slots: &self.slots,
                options: &self.options,
            },
        )?;
        map.serialize_entry(&self.options.fields.collection_id, &self.options.collection_id)?;
        map.end()
    }
}

struct Slots<'a> {
    slots: &'a [Option<ImageRecord>],
    options: &'a ManifestOptions,
}

impl Serialize for Slots<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.slots.len()))?;
        for slot in self.slots {
            let view = slot.as_ref().map(|record| RecordView {
                record,
                options: self.options,
            });
            seq.serialize_element(&view)?;
        }
        seq.end()
    }
}

struct RecordView<'a> {
    record: &'a ImageRecord,
    options: &'a ManifestOptions,
}

impl Serialize for RecordView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = &self.options.fields;
        let styles = self.options.flag_styles;
        let record = self.record;
        let render = |flag, style| RenderedFlag {
            flag,
            style,
            tokens: &self.options.tokens,
        };

        let mut map = serializer.serialize_map(Some(10))?;
        map.serialize_entry(&fields.id, &record.id)?;
        map.serialize_entry(&fields.title, &record.title)?;
        map.serialize_entry(&fields.alt_text, &record.alt_text)?;
        map.serialize_entry(&fields.symbol, &render(record.is_symbol, styles.symbol))?;
        map.serialize_entry(&fields.media_type, &record.media_type)?;
        map.serialize_entry(
            &fields.creation_date,
            &record.creation_date.format("%Y-%m-%d").to_string(),
        )?;
        map.serialize_entry(&fields.copyright, &render(record.is_copyright, styles.copyright))?;
        map.serialize_entry(&fields.file_info, &record.file_info)?;
        map.serialize_entry(
            &fields.publishable,
            &render(record.is_publishable, styles.publishable),
        )?;
        map.serialize_entry(&fields.migrated_info, &record.migrated_info)?;
        map.end()
    }
}
