//! Integration tests for the `bencode` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the to-json,
//! from-json, info-hash and show subcommands through the actual binary,
//! including stdin/stdout piping, file I/O, error handling, and byte-exact
//! roundtrips of binary data.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: a single-file torrent whose `pieces` value is the bytes 0..20.
fn sample_torrent() -> Vec<u8> {
    let mut raw = b"d8:announce20:http://t.example/ann4:infod6:lengthi12e4:name5:a.txt12:piece lengthi16384e6:pieces20:".to_vec();
    raw.extend(0u8..20);
    raw.extend_from_slice(b"ee");
    raw
}

const SAMPLE_INFO_HASH: &str = "1df51aef4c2a9826f437f98512c49719c4dfe0c7";

fn bencode() -> Command {
    Command::cargo_bin("bencode").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// to-json subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn to_json_stdin_to_stdout() {
    let output = bencode()
        .arg("to-json")
        .write_stdin("d3:cow3:moo4:spaml1:a1:bee")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"cow": "moo", "spam": ["a", "b"]}));
}

#[test]
fn to_json_escapes_binary_strings() {
    let output = bencode()
        .arg("to-json")
        .write_stdin(sample_torrent())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["info"]["pieces"],
        "%00%01%02%03%04%05%06%07%08%09%0a%0b%0c%0d%0e%0f%10%11%12%13"
    );
    assert_eq!(json["info"]["piece length"], 16384);
}

#[test]
fn to_json_emits_keys_in_sorted_order() {
    bencode()
        .arg("to-json")
        .write_stdin("d1:bi2e1:ai1ee")
        .assert()
        .success()
        .stdout("{\n  \"a\": 1,\n  \"b\": 2\n}\n");
}

#[test]
fn to_json_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.torrent");
    let output = dir.path().join("sample.json");
    std::fs::write(&input, sample_torrent()).unwrap();

    bencode()
        .args(["to-json", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&output).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["announce"], "http://t.example/ann");
    assert_eq!(json["info"]["name"], "a.txt");
}

#[test]
fn to_json_rejects_empty_input() {
    bencode()
        .arg("to-json")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input contains no bencode value"));
}

#[test]
fn to_json_reports_syntax_errors() {
    bencode()
        .arg("to-json")
        .write_stdin("i5-3e")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse bencode input"))
        .stderr(predicate::str::contains("byte 2"));
}

#[test]
fn to_json_respects_max_depth() {
    bencode()
        .args(["to-json", "--max-depth", "2"])
        .write_stdin("llleee")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting deeper than 2 levels"));

    bencode()
        .args(["to-json", "--max-depth", "3"])
        .write_stdin("llleee")
        .assert()
        .success();
}

#[test]
fn to_json_missing_file() {
    bencode()
        .args(["to-json", "-i", "/nonexistent/path/file.torrent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// from-json subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn from_json_stdin_to_stdout() {
    bencode()
        .arg("from-json")
        .write_stdin(r#"{"spam": ["a", "b"], "cow": "moo"}"#)
        .assert()
        .success()
        .stdout("d3:cow3:moo4:spaml1:a1:bee");
}

#[test]
fn from_json_unescapes_binary_strings() {
    bencode()
        .arg("from-json")
        .write_stdin(r#"["%00%ff", "100%25"]"#)
        .assert()
        .success()
        .stdout(&b"l2:\x00\xff4:100%e"[..]);
}

#[test]
fn from_json_rejects_booleans() {
    bencode()
        .arg("from-json")
        .write_stdin(r#"{"private": true}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to convert JSON to bencode"))
        .stderr(predicate::str::contains("unsupported JSON value"));
}

#[test]
fn from_json_rejects_invalid_json() {
    bencode()
        .arg("from-json")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON parse error"));
}

#[test]
fn from_json_rejects_malformed_escape() {
    bencode()
        .arg("from-json")
        .write_stdin(r#""50%""#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid escape sequence"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Roundtrip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_torrent_through_json() {
    let original = sample_torrent();

    let json = bencode()
        .arg("to-json")
        .write_stdin(original.clone())
        .output()
        .unwrap();
    assert!(json.status.success());

    let raw = bencode()
        .arg("from-json")
        .write_stdin(json.stdout)
        .output()
        .unwrap();
    assert!(raw.status.success());
    assert_eq!(raw.stdout, original);
}

#[test]
fn roundtrip_via_files() {
    let dir = tempfile::tempdir().unwrap();
    let torrent = dir.path().join("in.torrent");
    let json = dir.path().join("mid.json");
    let back = dir.path().join("out.torrent");
    std::fs::write(&torrent, sample_torrent()).unwrap();

    bencode()
        .arg("to-json")
        .arg("-i")
        .arg(&torrent)
        .arg("-o")
        .arg(&json)
        .assert()
        .success();
    bencode()
        .arg("from-json")
        .arg("-i")
        .arg(&json)
        .arg("-o")
        .arg(&back)
        .assert()
        .success();

    assert_eq!(std::fs::read(&back).unwrap(), sample_torrent());
}

// ─────────────────────────────────────────────────────────────────────────────
// info-hash subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn info_hash_of_sample_torrent() {
    bencode()
        .arg("info-hash")
        .write_stdin(sample_torrent())
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{SAMPLE_INFO_HASH}\n")));
}

#[test]
fn info_hash_requires_info_dictionary() {
    bencode()
        .arg("info-hash")
        .write_stdin("d4:name1:xe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input has no info dictionary"));
}

// ─────────────────────────────────────────────────────────────────────────────
// show subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn show_prints_indented_tree() {
    bencode()
        .arg("show")
        .write_stdin("d3:cow3:moo4:spaml1:ai7eee")
        .assert()
        .success()
        .stdout(
            "dictionary\n  key cow | string moo\n  key spam | list\n    [0] string a\n    [1] integer 7\n",
        );
}

#[test]
fn show_escapes_binary_values() {
    bencode()
        .arg("show")
        .write_stdin(&b"l2:\x00%e"[..])
        .assert()
        .success()
        .stdout("list\n  [0] string %00%25\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// General
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    bencode()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("to-json"))
        .stdout(predicate::str::contains("from-json"))
        .stdout(predicate::str::contains("info-hash"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn missing_subcommand_fails() {
    bencode()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
