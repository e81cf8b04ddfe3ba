use std::fs;
use std::path::{Path, PathBuf};

use logging::{MemoryJournal, NullJournal, Severity};
use transport::TransferError;

use super::*;
use crate::StaticProcess;

const PROPERTY: &str = "plugin_intranda_step_image_selection";

/// Records calls and fails on request.
#[derive(Default)]
struct Recording {
    directories: Vec<PathBuf>,
    sent: Vec<String>,
    fail_directory: bool,
    fail_names: Vec<&'static str>,
}

impl Transport for Recording {
    fn describe(&self) -> String {
        "recording".to_owned()
    }

    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError> {
        self.directories.push(directory.to_path_buf());
        if self.fail_directory {
            return Err(TransferError::RemoteCommand {
                command: format!("mkdir -p {}", directory.display()),
                status: Some(1),
            });
        }
        Ok(())
    }

    fn send_file(
        &mut self,
        source: &Path,
        _directory: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        self.sent.push(name.to_owned());
        if self.fail_names.contains(&name) {
            return Err(TransferError::Protocol {
                target: name.to_owned(),
                message: "refused".to_owned(),
            });
        }
        assert!(source.exists(), "source {} should exist", source.display());
        Ok(())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    images: PathBuf,
    target: PathBuf,
}

fn fixture(names: &[&str]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    for name in names {
        fs::write(images.join(name), name.as_bytes()).unwrap();
    }
    let target = dir.path().join("target");
    Fixture {
        _dir: dir,
        images,
        target,
    }
}

fn settings(target: &Path, extra: &[(&str, &str)]) -> ExportSettings {
    let mut pairs = vec![
        ("propertyName".to_owned(), PROPERTY.to_owned()),
        ("sourceFolder".to_owned(), "media".to_owned()),
        ("targetFolder".to_owned(), target.display().to_string()),
    ];
    pairs.extend(extra.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));
    ExportSettings::from_pairs(pairs).unwrap()
}

fn process(fixture: &Fixture, selection: &str) -> StaticProcess {
    StaticProcess::new(42)
        .with_property(PROPERTY, selection)
        .with_image_folder("media", &fixture.images)
}

#[test]
fn images_are_delivered_in_listing_order() {
    let fixture = fixture(&["a.jpg", "b.jpg", "c.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"c.jpg":1,"a.jpg":2}"#),
        NullJournal,
        &mut transport,
    );

    assert!(outcome.success, "{:?}", outcome.problems);
    assert_eq!(transport.directories, [fixture.target.clone()]);
    assert_eq!(transport.sent, ["a.jpg", "c.jpg"]);
    assert_eq!(outcome.exported, ["a.jpg", "c.jpg"]);
    assert!(outcome.problems.is_empty());
}

#[test]
fn missing_property_is_reported_and_aborts() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let process = StaticProcess::new(1).with_image_folder("media", &fixture.images);
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(&process, NullJournal, &mut transport);

    assert!(!outcome.success);
    assert!(outcome.problems[0].contains("Can not find the process property"));
    assert!(outcome.problems[1].contains("No image is selected"));
    assert!(transport.directories.is_empty());
}

#[test]
fn empty_selection_aborts_without_touching_the_destination() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let mut transport = Recording::default();

    let outcome =
        orchestrator.run_with_transport(&process(&fixture, "{}"), NullJournal, &mut transport);

    assert!(!outcome.success);
    assert_eq!(outcome.problems.len(), 1);
    assert!(transport.directories.is_empty());
}

#[test]
fn undecodable_selection_is_an_error() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":x}"#),
        NullJournal,
        &mut Recording::default(),
    );

    assert!(!outcome.success);
    assert!(outcome.problems[0].contains("cannot decode selection"));
}

#[test]
fn unknown_source_folder_aborts() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let process = StaticProcess::new(1).with_property(PROPERTY, r#"{"a.jpg":1}"#);

    let outcome = orchestrator.run_with_transport(&process, NullJournal, &mut Recording::default());

    assert!(!outcome.success);
    assert!(outcome.problems[0].contains("'media' does not exist yet"));
}

#[test]
fn missing_selected_file_is_a_warning_only() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":1,"gone.jpg":2}"#),
        NullJournal,
        &mut transport,
    );

    assert!(outcome.success);
    assert_eq!(outcome.problems.len(), 1);
    assert!(outcome.problems[0].contains("gone.jpg"));
    assert_eq!(transport.sent, ["a.jpg"]);
}

#[test]
fn failed_image_does_not_stop_other_artifacts() {
    let fixture = fixture(&["a.jpg", "b.jpg"]);
    let orchestrator =
        ExportOrchestrator::new(settings(&fixture.target, &[("exportJSON", "yes")]));
    let mut transport = Recording {
        fail_names: vec!["a.jpg"],
        ..Recording::default()
    };

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":1,"b.jpg":2}"#),
        NullJournal,
        &mut transport,
    );

    assert!(!outcome.success);
    assert_eq!(transport.sent, ["a.jpg", "b.jpg", "selected.json"]);
    assert_eq!(outcome.exported, ["b.jpg"]);
    assert_eq!(outcome.problems.len(), 1);
    assert!(outcome.problems[0].contains("Failed to export image a.jpg"));
}

#[test]
fn destination_failure_aborts_everything() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(
        &fixture.target,
        &[("exportJSON", "yes"), ("exportMetsFile", "yes")],
    ));
    let mut transport = Recording {
        fail_directory: true,
        ..Recording::default()
    };

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":1}"#),
        NullJournal,
        &mut transport,
    );

    assert!(!outcome.success);
    assert!(transport.sent.is_empty());
    assert!(outcome.problems[0].contains("Failed to create the target folder"));
}

#[test]
fn structure_without_document_fails_only_that_artifact() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator =
        ExportOrchestrator::new(settings(&fixture.target, &[("exportMetsFile", "yes")]));
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":1}"#),
        NullJournal,
        &mut transport,
    );

    assert!(!outcome.success);
    assert_eq!(transport.sent, ["a.jpg"]);
    assert!(outcome.problems[0].contains("no structural document"));
}

#[test]
fn incomplete_configuration_is_reported() {
    let orchestrator = ExportOrchestrator::new(ExportSettings::default());
    let outcome = orchestrator.run(&StaticProcess::new(1), NullJournal);

    assert!(!outcome.success);
    assert!(outcome.problems[0].contains("propertyName, sourceFolder, targetFolder"));
}

#[test]
fn variables_and_subfolders_shape_the_destination() {
    let fixture = fixture(&["a.jpg"]);
    let target = format!("{}/{{processtitle}}", fixture.target.display());
    let orchestrator = ExportOrchestrator::new(
        ExportSettings::from_pairs([
            ("propertyName", "{prop}"),
            ("sourceFolder", "media"),
            ("targetFolder", target.as_str()),
            ("createSubfolders", "yes"),
        ])
        .unwrap(),
    );
    let process = process(&fixture, r#"{"a.jpg":1}"#)
        .with_variable("processtitle", "book_1")
        .with_variable("prop", PROPERTY);
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(&process, NullJournal, &mut transport);

    let expected = fixture.target.join("book_1").join("media");
    assert!(outcome.success, "{:?}", outcome.problems);
    assert_eq!(transport.directories, [expected.clone()]);
    assert_eq!(outcome.destination, Some(expected));
}

#[test]
fn problems_are_journalled_for_positive_process_ids() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator = ExportOrchestrator::new(settings(&fixture.target, &[]));
    let mut journal = MemoryJournal::new();

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, "{}"),
        &mut journal,
        &mut Recording::default(),
    );

    assert!(!outcome.success);
    let entry = &journal.entries()[0];
    assert_eq!(entry.process_id, 42);
    assert_eq!(entry.severity, Severity::Info);
    assert_eq!(entry.message, outcome.problems[0]);
    assert!(entry.message.starts_with("Selected images export: "));
}

#[test]
fn unreachable_scp_host_fails_before_any_delivery() {
    let settings = ExportSettings::from_pairs([
        ("propertyName", "p"),
        ("sourceFolder", "media"),
        ("targetFolder", "/t"),
        ("useScp", "yes"),
        ("scpLogin", "goobi"),
        ("scpPassword", "pw"),
        ("scpHostname", "127.0.0.1"),
        ("scpPort", "1"),
        ("scpTimeout", "2"),
        ("knownHosts", "/nonexistent/known_hosts"),
    ])
    .unwrap();

    let outcome = ExportOrchestrator::new(settings).run(&StaticProcess::new(0), NullJournal);

    assert!(!outcome.success);
    assert!(outcome.problems[0].starts_with("Selected images export: Cannot open the transport"));
}

#[test]
fn manifest_is_staged_in_the_provided_directory() {
    let fixture = fixture(&["b.jpg", "a.jpg"]);
    let staging = tempfile::tempdir().unwrap();
    let orchestrator =
        ExportOrchestrator::new(settings(&fixture.target, &[("exportJSON", "yes")]));
    let process = process(&fixture, r#"{"b.jpg":1,"a.jpg":2}"#)
        .with_staging_directory(staging.path());
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(&process, NullJournal, &mut transport);

    assert!(outcome.success, "{:?}", outcome.problems);
    assert_eq!(transport.sent, ["a.jpg", "b.jpg", "selected.json"]);
    let staged = fs::read_to_string(staging.path().join("selected.json")).unwrap();
    assert!(staged.find("\"b.jpg\"").unwrap() < staged.find("\"a.jpg\"").unwrap());
}

#[test]
fn oversized_position_is_rejected_without_delivery() {
    let fixture = fixture(&["a.jpg"]);
    let orchestrator =
        ExportOrchestrator::new(settings(&fixture.target, &[("exportJSON", "yes")]));
    let mut transport = Recording::default();

    let outcome = orchestrator.run_with_transport(
        &process(&fixture, r#"{"a.jpg":4294967295}"#),
        NullJournal,
        &mut transport,
    );

    assert!(!outcome.success);
    assert!(outcome.problems[0].contains("cannot decode selection"));
    assert!(outcome.problems[0].contains("the highest allowed is 100000"));
    assert!(transport.directories.is_empty());
}
