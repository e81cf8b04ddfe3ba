//! Integration tests for routing reported messages to the journal.
//!
//! These tests cover the journal line format, edge cases such as empty and
//! multi-byte messages, and the problem list ordering a run hands back.

use logging::{JournalSink, LineMode, MemoryJournal, Reporter, Severity};

// ============================================================================
// Journal Rendering
// ============================================================================

/// Verifies each severity renders its label in the journal line.
#[test]
fn journal_lines_carry_severity_labels() {
    let mut reporter = Reporter::new(42, JournalSink::new(Vec::new()));
    reporter.debug("d");
    reporter.info("i");
    reporter.warning("w");
    reporter.error("e");

    let output = String::from_utf8(reporter.into_journal().into_inner()).unwrap();
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(
        lines,
        [
            "[42] DEBUG: Selected images export: d",
            "[42] INFO: Selected images export: i",
            "[42] WARN: Selected images export: w",
            "[42] ERROR: Selected images export: e",
        ]
    );
}

/// Verifies a sink without newlines concatenates entries.
#[test]
fn journal_without_newlines_concatenates() {
    let sink = JournalSink::with_line_mode(Vec::new(), LineMode::WithoutNewline);
    let mut reporter = Reporter::new(1, sink);
    reporter.info("a");
    reporter.info("b");

    let output = String::from_utf8(reporter.into_journal().into_inner()).unwrap();
    assert_eq!(
        output,
        "[1] INFO: Selected images export: a[1] INFO: Selected images export: b"
    );
}

// ============================================================================
// Edge Cases
// ============================================================================

/// Verifies empty messages still carry the prefix.
#[test]
fn empty_message_keeps_prefix() {
    let mut reporter = Reporter::new(1, MemoryJournal::new());
    reporter.warning("");
    assert_eq!(reporter.problems(), ["Selected images export: "]);
}

/// Verifies multi-byte file names survive unchanged.
#[test]
fn unicode_message_is_preserved() {
    let mut reporter = Reporter::new(5, MemoryJournal::new());
    reporter.error("could not copy 'Übersicht – Seite 1.tif'");

    let journal = reporter.into_journal();
    assert_eq!(journal.entries()[0].severity, Severity::Error);
    assert!(journal.entries()[0].message.ends_with("'Übersicht – Seite 1.tif'"));
}

// ============================================================================
// Problem Ordering
// ============================================================================

/// Verifies problems are kept in emission order, including abort reasons.
#[test]
fn problems_follow_emission_order() {
    let mut reporter = Reporter::new(0, MemoryJournal::new());
    reporter.error("first");
    reporter.info("not a problem");
    reporter.warning("second");
    reporter.abort("third");

    let (journal, problems) = reporter.into_parts();
    assert!(journal.entries().is_empty());
    assert_eq!(
        problems,
        [
            "Selected images export: first",
            "Selected images export: second",
            "Selected images export: third",
        ]
    );
}
