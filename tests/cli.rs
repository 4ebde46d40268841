//! CLI command integration tests.
//!
//! These tests run the built `arcmgr` binary against archives written to a
//! temporary directory and inspect its exit code and JSON output.

#![cfg(feature = "cli")]

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

mod common;

fn arcmgr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arcmgr"))
        .args(args)
        .output()
        .expect("run arcmgr")
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid JSON output")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("UTF-8 temp path")
}

/// Archives opened from disk are labelled with their full path.
fn label_ends_with(value: &Value, name: &str) -> bool {
    value.as_str().is_some_and(|label| label.ends_with(name))
}

// =============================================================================
// Identify Command Tests
// =============================================================================

#[test]
fn test_identify_reports_each_file() {
    let dir = common::temp_dir();
    let wad = common::write_file(dir.path(), "doom2.wad", &common::pwad(&[]));
    let text = common::write_file(dir.path(), "notes.txt", b"hello");

    let output = arcmgr(&["-f", "json", "identify", arg(&wad), arg(&text)]);
    assert_eq!(output.status.code(), Some(1));

    let value = json(&output);
    assert_eq!(value[0]["format"], "wad");
    assert_eq!(value[1]["format"], Value::Null);
}

#[test]
fn test_identify_human_output() {
    let dir = common::temp_dir();
    let pk3 = common::write_file(dir.path(), "mod.pk3", &common::zip_bytes(&[("a", b"a")]));

    let output = arcmgr(&["id", arg(&pk3)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("zip"));
}

// =============================================================================
// List Command Tests
// =============================================================================

#[test]
fn test_list_nested() {
    let dir = common::temp_dir();
    let pk3 = common::zip_bytes(&[
        ("maps.wad", &common::pwad(&[("MAP01", b"map")])),
        ("sprites/TROOA1.png", b"png"),
    ]);
    let path = common::write_file(dir.path(), "mod.pk3", &pk3);

    let output = arcmgr(&["--format", "json", "list", "--nested", arg(&path)]);
    assert!(output.status.success());

    let value = json(&output);
    let archives = value.as_array().unwrap();
    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0]["format"], "zip");
    assert_eq!(archives[1]["name"], "maps.wad");
    assert!(label_ends_with(&archives[1]["parent"], "/mod.pk3"));
    assert_eq!(archives[1]["entries"][0]["path"], "MAP01");
}

#[test]
fn test_list_missing_file() {
    let dir = common::temp_dir();
    let output = arcmgr(&["list", arg(&dir.path().join("missing.wad"))]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_list_unrecognized_file() {
    let dir = common::temp_dir();
    let path = common::write_file(dir.path(), "notes.txt", b"hello");
    let output = arcmgr(&["list", arg(&path)]);
    assert_eq!(output.status.code(), Some(3));
}

// =============================================================================
// Find Command Tests
// =============================================================================

#[test]
fn test_find_prefers_archives_over_base() {
    let dir = common::temp_dir();
    let base = common::write_file(
        dir.path(),
        "doom2.wad",
        &common::wad_bytes(true, &[("PLAYPAL", b"base"), ("COLORMAP", b"c")]),
    );
    let pwad = common::write_file(dir.path(), "mod.wad", &common::pwad(&[("PLAYPAL", b"mod")]));

    let output = arcmgr(&["-f", "json", "find", "PLAYPAL", "-a", arg(&pwad), "-b", arg(&base)]);
    assert!(output.status.success());
    let value = json(&output);
    assert!(label_ends_with(&value["matches"][0]["archive"], "/mod.wad"));

    let output = arcmgr(&["-f", "json", "find", "COLORMAP", "-a", arg(&pwad), "-b", arg(&base)]);
    assert!(label_ends_with(&json(&output)["matches"][0]["archive"], "/doom2.wad"));

    let output = arcmgr(&[
        "-f", "json", "find", "PLAY*", "--all", "-a", arg(&pwad), "-b", arg(&base),
    ]);
    let value = json(&output);
    let matches = value["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert!(label_ends_with(&matches[0]["archive"], "/doom2.wad"));
    assert!(label_ends_with(&matches[1]["archive"], "/mod.wad"));
}

#[test]
fn test_find_nothing() {
    let dir = common::temp_dir();
    let pwad = common::write_file(dir.path(), "mod.wad", &common::pwad(&[("A", b"a")]));

    let output = arcmgr(&["find", "MISSING", "-a", arg(&pwad)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("MISSING not found"));
}

// =============================================================================
// Check Command Tests
// =============================================================================

#[test]
fn test_check_reports_duplicates() {
    let dir = common::temp_dir();
    let path = common::write_file(
        dir.path(),
        "dups.wad",
        &common::pwad(&[("THINGS", b"1"), ("THINGS", b"2"), ("A", b"same"), ("B", b"same")]),
    );

    let output = arcmgr(&["-f", "json", "check", arg(&path)]);
    assert_eq!(output.status.code(), Some(1));

    let value = json(&output);
    assert_eq!(value["duplicate_names"], serde_json::json!([["THINGS", "THINGS"]]));
    assert_eq!(value["duplicate_content"], serde_json::json!([["A", "B"]]));
}

#[test]
fn test_check_clean_archive() {
    let dir = common::temp_dir();
    let path = common::write_file(dir.path(), "clean.wad", &common::pwad(&[("A", b"1"), ("B", b"2")]));

    let output = arcmgr(&["check", arg(&path)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Duplicate names: none"));
}

#[test]
fn test_completions() {
    let output = arcmgr(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}
