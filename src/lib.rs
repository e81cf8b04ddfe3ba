#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! src/lib.rs
//!
//! # Overview
//!
//! Facade over the selected images export workspace. A host that stores an
//! image selection per process calls [`ExportOrchestrator::run`] to copy the
//! selected images to a local or SCP destination, optionally with a JSON
//! manifest and a structural document pruned to the selection.
//!
//! The member crates are re-exported whole:
//!
//! - [`selection`] decodes stored selections and resolves them against a
//!   source folder.
//! - [`structure`] holds the structural document, its METS codec and the
//!   pruner.
//! - [`manifest`] builds the manifest.
//! - [`transport`] delivers files.
//! - [`logging`] installs tracing and routes run reports to the journal.
//! - [`export`] holds settings and the orchestrator.
//!
//! # Examples
//!
//! ```
//! use selected_images_export::{ExportOrchestrator, ExportSettings, StaticProcess};
//! use selected_images_export::logging::MemoryJournal;
//!
//! let settings = ExportSettings::from_pairs([
//!     ("propertyName", "selection"),
//!     ("sourceFolder", "media"),
//!     ("targetFolder", "/tmp/unused"),
//! ])
//! .unwrap();
//! let process = StaticProcess::new(3).with_property("selection", "{}");
//!
//! let mut journal = MemoryJournal::new();
//! let outcome = ExportOrchestrator::new(settings).run(&process, &mut journal);
//! assert!(!outcome.success);
//! assert_eq!(journal.entries().len(), 1);
//! ```

pub use export;
pub use logging;
pub use manifest;
pub use selection;
pub use structure;
pub use transport;

pub use export::{
    ConfigError, ExportError, ExportOrchestrator, ExportOutcome, ExportSettings, ProcessContext,
    SettingsFile, StaticProcess,
};
pub use logging::init_tracing;
