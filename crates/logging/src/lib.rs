#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging/src/lib.rs
//!
//! # Overview
//!
//! `logging` carries the diagnostics plumbing shared by every export crate.
//! Components emit structured events through the [`tracing`] macros using
//! targets of the form `export::<area>`; a single run additionally funnels its
//! operator-facing messages through a [`Reporter`], which fans each message
//! out to two sinks:
//!
//! - the tracing subscriber installed by [`init_tracing`], and
//! - a process-scoped [`Journal`], such as a [`JournalSink`] writing lines to
//!   any [`std::io::Write`] implementor.
//!
//! # Design
//!
//! [`JournalSink`] wraps a writer and renders one entry per call, honouring a
//! [`LineMode`] that decides whether entries end with a newline. The
//! [`Reporter`] owns its journal and the ordered problem list that a run
//! returns to its caller. Journal write failures never abort a run; they are
//! traced and dropped.
//!
//! # Invariants
//!
//! - Every message passed to a [`Reporter`] carries the
//!   [`REPORT_PREFIX`] exactly once.
//! - The journal only receives entries when the process id is positive.
//! - Warnings and errors always land in the problem list, in emission order.
//!
//! # Errors
//!
//! [`init_tracing`] fails with [`TracingInitError`] when its directive string
//! does not parse. Journal implementations surface [`std::io::Error`].
//!
//! # Examples
//!
//! ```
//! use logging::{JournalSink, Reporter};
//!
//! let mut reporter = Reporter::new(7, JournalSink::new(Vec::new()));
//! reporter.info("3 images selected");
//! reporter.error("copy of 00000018.jpg failed");
//!
//! assert_eq!(reporter.problems().len(), 1);
//! let journal = String::from_utf8(reporter.into_journal().into_inner()).unwrap();
//! assert!(journal.contains("[7] ERROR: Selected images export: copy of 00000018.jpg failed"));
//! ```

mod init;
mod journal;
mod line_mode;
mod reporter;
mod severity;

pub use init::{TracingInitError, init_tracing};
pub use journal::{Journal, JournalEntry, JournalSink, MemoryJournal, NullJournal};
pub use line_mode::LineMode;
pub use reporter::{REPORT_PREFIX, Reporter};
pub use severity::{ParseSeverityError, Severity};
