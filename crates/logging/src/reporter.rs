//! Dual-sink reporting for a single export run.

use crate::{Journal, Severity};

/// Prefix attached to every reported message.
pub const REPORT_PREFIX: &str = "Selected images export: ";

/// Routes a run's messages to tracing and the process journal, and keeps
/// the ordered list of problems returned to the caller.
#[derive(Debug)]
pub struct Reporter<J> {
    process_id: i64,
    journal: J,
    problems: Vec<String>,
}

impl<J: Journal> Reporter<J> {
    /// Creates a reporter for `process_id`.
    pub fn new(process_id: i64, journal: J) -> Self {
        Self {
            process_id,
            journal,
            problems: Vec::new(),
        }
    }

    /// Process the reporter journals against.
    pub const fn process_id(&self) -> i64 {
        self.process_id
    }

    /// Reports `message` at `severity`.
    ///
    /// Warnings and errors are appended to the problem list.
    pub fn report(&mut self, severity: Severity, message: &str) {
        let line = format!("{REPORT_PREFIX}{message}");
        match severity {
            Severity::Debug => tracing::debug!(target: "export::run", "{line}"),
            Severity::Info => tracing::info!(target: "export::run", "{line}"),
            Severity::Warning => tracing::warn!(target: "export::run", "{line}"),
            Severity::Error => tracing::error!(target: "export::run", "{line}"),
        }

        if self.process_id > 0
            && let Err(error) = self.journal.record(self.process_id, severity, &line)
        {
            tracing::warn!(
                target: "export::run",
                process_id = self.process_id,
                %error,
                "journal write failed"
            );
        }

        if severity.is_problem() {
            self.problems.push(line);
        }
    }

    /// Reports a debug message.
    pub fn debug(&mut self, message: &str) {
        self.report(Severity::Debug, message);
    }

    /// Reports an informational message.
    pub fn info(&mut self, message: &str) {
        self.report(Severity::Info, message);
    }

    /// Reports a warning.
    pub fn warning(&mut self, message: &str) {
        self.report(Severity::Warning, message);
    }

    /// Reports an error.
    pub fn error(&mut self, message: &str) {
        self.report(Severity::Error, message);
    }

    /// Reports the informational reason a run could not proceed.
    ///
    /// The message is logged at info level but still recorded as a problem
    /// so callers can tell why the run reported failure.
    pub fn abort(&mut self, message: &str) {
        self.report(Severity::Info, message);
        self.problems.push(format!("{REPORT_PREFIX}{message}"));
    }

    /// Problems recorded so far, in emission order.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Consumes the reporter, returning its problem list.
    pub fn into_problems(self) -> Vec<String> {
        self.problems
    }

    /// Consumes the reporter, returning its journal.
    pub fn into_journal(self) -> J {
        self.journal
    }

    /// Consumes the reporter, returning both journal and problems.
    pub fn into_parts(self) -> (J, Vec<String>) {
        (self.journal, self.problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryJournal, NullJournal};
    use std::io;

    #[test]
    fn messages_carry_prefix() {
        let mut reporter = Reporter::new(4, MemoryJournal::new());
        reporter.info("started");
        let journal = reporter.into_journal();
        assert_eq!(
            journal.entries()[0].message,
            "Selected images export: started"
        );
    }

    #[test]
    fn journal_skipped_without_positive_process_id() {
        for process_id in [0, -1] {
            let mut reporter = Reporter::new(process_id, MemoryJournal::new());
            reporter.error("boom");
            let (journal, problems) = reporter.into_parts();
            assert!(journal.entries().is_empty());
            assert_eq!(problems.len(), 1);
        }
    }

    #[test]
    fn only_problems_are_collected() {
        let mut reporter = Reporter::new(1, NullJournal);
        reporter.debug("d");
        reporter.info("i");
        reporter.warning("w");
        reporter.error("e");
        assert_eq!(
            reporter.problems(),
            ["Selected images export: w", "Selected images export: e"]
        );
    }

    #[test]
    fn abort_is_info_but_recorded() {
        let mut reporter = Reporter::new(2, MemoryJournal::new());
        reporter.abort("nothing selected");
        let (journal, problems) = reporter.into_parts();
        assert_eq!(journal.entries()[0].severity, Severity::Info);
        assert_eq!(problems, ["Selected images export: nothing selected"]);
    }

    struct FailingJournal;

    impl Journal for FailingJournal {
        fn record(&mut self, _: i64, _: Severity, _: &str) -> io::Result<()> {
            Err(io::Error::other("journal offline"))
        }
    }

    #[test]
    fn journal_failures_do_not_propagate() {
        let mut reporter = Reporter::new(9, FailingJournal);
        reporter.error("still reported");
        assert_eq!(reporter.problems().len(), 1);
    }
}
