#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/manifest/src/lib.rs
//!
//! # Overview
//!
//! `manifest` describes the exported images in a JSON document,
//! `{"<images>": [record, ...], "<collection>": id}`. Each [`ImageRecord`] is
//! derived from the image file: its stem, name, extension and a calendar
//! date from one of its timestamps.
//!
//! # Design
//!
//! Output keys come from a [`ManifestFieldNames`] value passed in with the
//! [`ManifestOptions`], never from shared state, so two builders with
//! different names can coexist. [`Manifest`] implements
//! [`serde::Serialize`] by hand because its keys are only known at run time.
//!
//! # Invariants
//!
//! - The record array has exactly as many slots as the highest position
//!   inserted; a record with position `n` is at index `n - 1`.
//! - Slots without a record serialise as `null`.
//! - Keys appear in a fixed order.
//!
//! # Errors
//!
//! [`ManifestError`] covers unreadable timestamps, contradictory field-name
//! overrides and write failures.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use manifest::{ImageRecord, ManifestBuilder, ManifestOptions};
//!
//! let mut builder = ManifestBuilder::new(ManifestOptions::default());
//! let date = NaiveDate::from_ymd_opt(2022, 11, 1).unwrap();
//! builder.insert(2, ImageRecord::new("00000019.jpg", date));
//!
//! let json = builder.build().to_json().unwrap();
//! assert!(json.contains("\"Aufnahmedatum\": \"2022-11-01\""));
//! assert!(json.contains("null"));
//! ```

mod builder;
mod error;
mod fields;
mod record;

pub use builder::{MANIFEST_FILE_NAME, Manifest, ManifestBuilder, ManifestOptions, build_manifest};
pub use error::ManifestError;
pub use fields::{
    FlagStyle, FlagStyles, FlagTokens, ManifestFieldNames, OVERRIDE_KEYS, ParseFlagStyleError,
};
pub use record::{
    ImageRecord, ParseTimestampSourceError, TimestampSource, file_date, media_type_for,
};
