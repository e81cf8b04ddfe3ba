#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/export/src/lib.rs
//!
//! # Overview
//!
//! `export` runs a selected images export for one process. An
//! [`ExportOrchestrator`] reads the stored selection through a
//! [`ProcessContext`], resolves it against the source folder, delivers the
//! images, and optionally delivers a JSON manifest and a pruned structural
//! document to the same destination.
//!
//! Settings come from [`ExportSettings`], built from key/value pairs or a
//! [`SettingsFile`] with global parameters and per-project sections.
//!
//! # Design
//!
//! The orchestrator is thin. Decoding, resolution, delivery, manifest
//! building and pruning live in their own crates; this crate sequences them
//! and turns every failure into a report through [`logging::Reporter`].
//!
//! Images are delivered in folder listing order. Only the manifest and the
//! structural document follow the selected order.
//!
//! # Invariants
//!
//! - Manifest, structure and image delivery are attempted independently
//!   once the selection resolved; a failure in one does not undo another.
//! - A destination folder that cannot be created stops the run before any
//!   file is sent.
//! - An SSH session lives for exactly one run and is closed when it ends.
//!
//! # Errors
//!
//! Runs never return errors. [`ExportOutcome::success`] is false when any
//! enabled artifact failed and [`ExportOutcome::problems`] lists what was
//! reported. [`ConfigError`] is returned by the configuration API.
//!
//! # Examples
//!
//! ```
//! use export::{ExportOrchestrator, ExportSettings, StaticProcess};
//! use logging::NullJournal;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let images = dir.path().join("images");
//! std::fs::create_dir(&images).unwrap();
//! std::fs::write(images.join("00000001.jpg"), b"jpeg").unwrap();
//! let target = dir.path().join("out");
//!
//! let settings = ExportSettings::from_pairs([
//!     ("propertyName", "selection"),
//!     ("sourceFolder", "media"),
//!     ("targetFolder", target.to_str().unwrap()),
//! ])
//! .unwrap();
//! let process = StaticProcess::new(1)
//!     .with_property("selection", r#"{"00000001.jpg":1}"#)
//!     .with_image_folder("media", &images);
//!
//! let outcome = ExportOrchestrator::new(settings).run(&process, NullJournal);
//! assert!(outcome.success);
//! assert!(target.join("00000001.jpg").exists());
//! ```

pub mod config;
mod context;
mod error;
mod orchestrator;

pub use config::{ExportSettings, ScpSettings, SettingsFile, normalize_key};
pub use context::{ProcessContext, StaticProcess, destination_folder};
pub use error::{ConfigError, ExportError};
pub use orchestrator::{
    ExportOrchestrator, ExportOutcome, METS_FILE_NAME, STAGED_METS_FILE_NAME, open_transport,
};
