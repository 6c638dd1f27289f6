//! End-to-end tests for the odk-transfer binary
//!
//! This module tests:
//! - Bundle layout for a form and its media
//! - Isolation of malformed forms and missing media
//! - Re-runs against a populated destination
//! - Configuration file handling and exit status

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn odk_transfer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("odk-transfer").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("ODK_TRANSFER_DESTINATION");
    cmd
}

#[test]
fn test_survey_bundle_layout() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/survey.xml", "survey", &[("photo", "img1.png")]);
    workspace.write_file("root/img1.png", b"\x89PNG fake image");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "--destination", "dest"])
        .assert()
        .success()
        .stderr(predicate::str::contains("done"));

    let hashed = format!("{}.png", common::md5_hex(b"\x89PNG fake image"));
    assert_eq!(
        workspace.list_dir("dest/survey"),
        vec![hashed.clone(), "survey.json".to_string(), "survey.xml".to_string()]
    );
    assert_eq!(
        workspace.read_file("dest/survey/survey.xml"),
        workspace.read_file("root/survey.xml")
    );

    let json: serde_json::Value =
        serde_json::from_str(&workspace.read_file("dest/survey/survey.json")).unwrap();
    assert_eq!(json["photo"], serde_json::json!(hashed));
    assert_eq!(
        json["meta"]["transfer"]["originalPath"],
        serde_json::json!(common::path_str(&workspace.join("root/survey.xml")))
    );
    assert_eq!(json["meta"]["instanceID"], serde_json::json!("uuid:survey-0001"));
}

#[test]
fn test_malformed_xml_does_not_stop_the_run() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/good.xml", "good", &[("photo", "a.jpg")]);
    workspace.write_file("root/a.jpg", "jpg");
    workspace.write_file("root/broken.xml", "<data><meta><instanceID>");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest"])
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.xml"));

    assert!(workspace.file_exists("dest/good/good.json"));
    assert!(!workspace.file_exists("dest/broken"));
}

#[test]
fn test_strict_exit_status_on_failures() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/good.xml", "good", &[]);
    workspace.write_file("root/broken.xml", "<data><meta>");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest", "--strict"])
        .assert()
        .code(2);

    assert!(workspace.file_exists("dest/good/good.json"));
}

#[test]
fn test_strict_success_without_failures() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/good.xml", "good", &[]);

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest", "--strict"])
        .assert()
        .success();
}

#[test]
fn test_missing_media_is_warned_and_dropped() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/survey.xml", "survey", &[("photo", "lost.jpg")]);

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest"])
        .assert()
        .success()
        .stderr(predicate::str::contains("media file not found"));

    assert_eq!(
        workspace.list_dir("dest/survey"),
        vec!["survey.json".to_string(), "survey.xml".to_string()]
    );
    let json = workspace.read_file("dest/survey/survey.json");
    assert!(json.contains("lost.jpg"));
}

#[test]
fn test_rerun_leaves_existing_files_untouched() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/survey.xml", "survey", &[("photo", "img1.png")]);
    workspace.write_file("root/img1.png", "png");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest"])
        .assert()
        .success();

    // Hand-edit the output; a second run must not restore it
    workspace.write_file("dest/survey/survey.json", "{\"edited\": true}");
    let before = workspace.modified("dest/survey/survey.json");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest"])
        .assert()
        .success();

    assert_eq!(
        workspace.read_file("dest/survey/survey.json"),
        "{\"edited\": true}"
    );
    assert_eq!(workspace.modified("dest/survey/survey.json"), before);
}

#[test]
fn test_media_preferred_from_form_directory() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("root/a/survey.xml", "survey", &[("photo", "photo.jpg")]);
    workspace.write_file("root/a/photo.jpg", "right photo");
    workspace.write_file("root/0-other/photo.jpg", "wrong photo");

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["root", "-d", "dest"])
        .assert()
        .success();

    let hashed = format!("{}.jpg", common::md5_hex(b"right photo"));
    assert_eq!(workspace.read_file(&format!("dest/survey/{hashed}")), "right photo");
}

#[test]
fn test_roots_and_destination_from_config_file() {
    let workspace = common::TestWorkspace::new();
    workspace.write_form("collections/2014/visit.xml", "visit", &[("audio", "note.m4a")]);
    workspace.write_file("collections/2014/note.m4a", "audio");
    workspace.write_form("collections/2014/backup/visit-old.xml", "old", &[]);
    workspace.write_file(
        "odk-transfer.yaml",
        "roots:\n  - collections/2014\ndestination: out\nexclude:\n  - \"backup/**\"\n",
    );

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .assert()
        .success();

    assert!(workspace.file_exists("out/visit/visit.json"));
    assert!(workspace.file_exists(&format!("out/visit/{}.m4a", common::md5_hex(b"audio"))));
    assert!(!workspace.file_exists("out/visit-old"));
}

#[test]
fn test_no_roots_is_an_error() {
    let workspace = common::TestWorkspace::new();

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["-d", "dest"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No root directories"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let workspace = common::TestWorkspace::new();

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["--config", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_missing_root_still_completes() {
    let workspace = common::TestWorkspace::new();

    odk_transfer_cmd()
        .current_dir(&workspace.path)
        .args(["does-not-exist", "-d", "dest"])
        .assert()
        .success()
        .stderr(predicate::str::contains("done"));
}
