//! Process journal sinks.

use std::io::{self, Write};

use crate::{LineMode, Severity};

/// Receives entries destined for a process-scoped journal.
pub trait Journal {
    /// Records `message` against `process_id`.
    fn record(&mut self, process_id: i64, severity: Severity, message: &str) -> io::Result<()>;
}

impl<J: Journal + ?Sized> Journal for &mut J {
    fn record(&mut self, process_id: i64, severity: Severity, message: &str) -> io::Result<()> {
        (**self).record(process_id, severity, message)
    }
}

impl<J: Journal + ?Sized> Journal for Box<J> {
    fn record(&mut self, process_id: i64, severity: Severity, message: &str) -> io::Result<()> {
        (**self).record(process_id, severity, message)
    }
}

/// Journal that discards every entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn record(&mut self, _: i64, _: Severity, _: &str) -> io::Result<()> {
        Ok(())
    }
}

/// A recorded journal entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JournalEntry {
    /// Process the entry belongs to.
    pub process_id: i64,
    /// Entry severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

/// Journal that keeps entries in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryJournal {
    entries: Vec<JournalEntry>,
}

impl MemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }
}

impl Journal for MemoryJournal {
    fn record(&mut self, process_id: i64, severity: Severity, message: &str) -> io::Result<()> {
        self.entries.push(JournalEntry {
            process_id,
            severity,
            message: message.to_owned(),
        });
        Ok(())
    }
}

/// Line-oriented journal that renders entries into a writer.
///
/// Each entry is rendered as `[<process id>] <SEVERITY>: <message>`. The
/// sink's [`LineMode`] decides whether a newline follows.
#[derive(Clone, Debug)]
pub struct JournalSink<W> {
    writer: W,
    line_mode: LineMode,
}

impl<W> JournalSink<W> {
    /// Creates a sink that appends a newline after each entry.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_line_mode(writer, LineMode::WithNewline)
    }

    /// Creates a sink with an explicit [`LineMode`].
    #[must_use]
    pub const fn with_line_mode(writer: W, line_mode: LineMode) -> Self {
        Self { writer, line_mode }
    }

    /// Returns the configured line mode.
    #[must_use]
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    /// Updates the line mode for subsequent entries.
    pub fn set_line_mode(&mut self, line_mode: LineMode) {
        self.line_mode = line_mode;
    }

    /// Borrows the underlying writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> JournalSink<W> {
    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Journal for JournalSink<W> {
    fn record(&mut self, process_id: i64, severity: Severity, message: &str) -> io::Result<()> {
        write!(self.writer, "[{process_id}] {severity}: {message}")?;
        if self.line_mode.append_newline() {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }
}
