// Integration tests for the `householder` binary.
// Run with: cargo test -p householder-cli --test cli

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const INPUT: &str = "\
First Name,Last Name,Name,Account Name
John,Smith,John Smith,John & Mary Smith Household
Ann,Lee,Ann Lee,Lee Household
Acme,Fund,Acme Fund,Acme Foundation Household
";

fn householder(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_householder"));
    cmd.current_dir(dir);
    // Never leak real credentials into tests
    for var in [
        "AIRTABLE_ACCESS_TOKEN",
        "AIRTABLE_BASE_ID",
        "AIRTABLE_CONTACTS_TABLE_ID",
        "AIRTABLE_API_BASE",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("accounts.csv"), INPUT).unwrap();
    dir
}

fn assert_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {code}, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

// ── Usage + preconditions ───────────────────────────────────────────

#[test]
fn no_command_is_usage_error() {
    let dir = workspace();
    let output = householder(dir.path()).output().expect("failed to run householder");
    assert_code(&output, 2);
}

#[test]
fn run_without_output_is_usage_error() {
    let dir = workspace();
    let output = householder(dir.path())
        .args(["run", "accounts.csv", "--offline"])
        .output()
        .unwrap();
    assert_code(&output, 2);
}

#[test]
fn missing_credentials_exit_50() {
    let dir = workspace();
    let output = householder(dir.path())
        .args(["run", "accounts.csv", "-o", "out.csv"])
        .output()
        .unwrap();

    assert_code(&output, 50);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AIRTABLE_ACCESS_TOKEN"), "stderr: {stderr}");
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn missing_input_exit_3() {
    let dir = workspace();
    let output = householder(dir.path())
        .args(["run", "nope.csv", "-o", "out.csv", "--offline"])
        .output()
        .unwrap();
    assert_code(&output, 3);
}

#[test]
fn missing_column_exit_3_with_hint() {
    let dir = workspace();
    fs::write(dir.path().join("bad.csv"), "First Name,Last Name\nA,B\n").unwrap();
    let output = householder(dir.path())
        .args(["canonicalize", "bad.csv", "-o", "out.csv"])
        .output()
        .unwrap();

    assert_code(&output, 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required column 'Name'"), "stderr: {stderr}");
    assert!(stderr.contains("hint:"));
}

#[test]
fn invalid_rules_exit_4() {
    let dir = workspace();
    fs::write(dir.path().join("rules.toml"), "conjunction = \" & \"\nseparators = [\" & \"]\n").unwrap();
    let output = householder(dir.path())
        .args(["run", "accounts.csv", "-o", "out.csv", "--offline", "--rules", "rules.toml"])
        .output()
        .unwrap();
    assert_code(&output, 4);
}

#[test]
fn rules_validate_reports_ok() {
    let dir = workspace();
    fs::write(dir.path().join("rules.toml"), "household_suffix = \" Family\"\n").unwrap();
    let output = householder(dir.path())
        .args(["rules", "validate", "rules.toml"])
        .output()
        .unwrap();

    assert_code(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rules.toml: ok"), "stdout: {stdout}");
}

#[test]
fn rules_validate_rejects_unknown_keys() {
    let dir = workspace();
    fs::write(dir.path().join("rules.toml"), "suffix = \" Family\"\n").unwrap();
    let output = householder(dir.path())
        .args(["rules", "validate", "rules.toml"])
        .output()
        .unwrap();
    assert_code(&output, 4);
}

// ── Offline end-to-end ──────────────────────────────────────────────

#[test]
fn offline_run_writes_export_and_json_summary() {
    let dir = workspace();
    let output = householder(dir.path())
        .args([
            "run", "accounts.csv", "-o", "out.csv", "--offline", "--json",
            "--summary", "summary.json", "--log-level", "off",
        ])
        .output()
        .unwrap();
    assert_code(&output, 0);

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "offline");
    assert_eq!(report["summary"]["rows_read"], 3);
    assert_eq!(report["summary"]["households"], 3);
    assert_eq!(report["summary"]["inferred_occupants"], 1);
    assert_eq!(report["summary"]["inferred_unmatched"], 1);
    assert_eq!(report["summary"]["exclusions"]["organization"], 1);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(saved["summary"], report["summary"]);

    let export = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    let lines: Vec<&str> = export.lines().collect();
    assert_eq!(lines[0], "Name,First Name,Last Name,Contact Affiliations,Account Name,Notes");
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("John Smith,John,Smith,,John & Mary Smith Household,"));
    assert!(lines[2].starts_with("Mary Smith,Mary,Smith,,John & Mary Smith Household,Created contact Mary Smith"));
    assert!(lines[4].contains("Ignoring household name with 'Account' or 'Foundation'"));
}

#[test]
fn canonicalize_never_infers() {
    let dir = workspace();
    let output = householder(dir.path())
        .args(["canonicalize", "accounts.csv", "-o", "canon.csv"])
        .output()
        .unwrap();
    assert_code(&output, 0);

    let export = fs::read_to_string(dir.path().join("canon.csv")).unwrap();
    assert_eq!(export.lines().count(), 4);
    assert!(!export.contains("Created contact"));
}

// ── Live directory (mock server) ────────────────────────────────────

fn contact(id: &str, name: &str, affiliations: &[&str]) -> serde_json::Value {
    let (first, last) = name.split_once(' ').unwrap();
    json!({
        "id": id,
        "fields": {
            "Name": name,
            "First Name": first,
            "Last Name": last,
            "Contact Affiliations": affiliations,
        }
    })
}

#[test]
fn live_run_patches_new_affiliations() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/v0/appTest/tblContacts")
            .header("authorization", "Bearer pat_test");
        then.status(200).json_body(json!({
            "records": [
                contact("recJ", "John Smith", &[]),
                contact("recM", "Mary Smith", &[]),
            ]
        }));
    });
    let john = server.mock(|when, then| {
        when.method(PATCH)
            .path("/v0/appTest/tblContacts/recJ")
            .json_body(json!({ "fields": { "Contact Affiliations": ["recM"] } }));
        then.status(200).json_body(contact("recJ", "John Smith", &["recM"]));
    });
    let mary = server.mock(|when, then| {
        when.method(PATCH)
            .path("/v0/appTest/tblContacts/recM")
            .json_body(json!({ "fields": { "Contact Affiliations": ["recJ"] } }));
        then.status(200).json_body(contact("recM", "Mary Smith", &["recJ"]));
    });

    let dir = workspace();
    let output = householder(dir.path())
        .env("AIRTABLE_API_BASE", server.base_url())
        .env("AIRTABLE_BASE_ID", "appTest")
        .args([
            "run", "accounts.csv", "-o", "out.csv", "--json",
            "--token", "pat_test", "--table", "tblContacts",
        ])
        .output()
        .unwrap();
    assert_code(&output, 0);

    list.assert();
    john.assert();
    mary.assert();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "live");
    assert_eq!(report["directory_contacts"], 2);
    assert_eq!(report["summary"]["inferred_matched"], 1);
    assert_eq!(report["summary"]["affiliation_updates"], 2);

    let export = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert!(export.contains("John Smith,John,Smith,Mary Smith,John & Mary Smith Household,"));
}

#[test]
fn dry_run_never_patches() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v0/appTest/tblContacts");
        then.status(200).json_body(json!({
            "records": [contact("recJ", "John Smith", &[]), contact("recM", "Mary Smith", &[])]
        }));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH);
        then.status(200).json_body(json!({}));
    });

    let dir = workspace();
    let output = householder(dir.path())
        .env("AIRTABLE_API_BASE", server.base_url())
        .args([
            "run", "accounts.csv", "-o", "out.csv", "--dry-run",
            "--token", "pat_test", "--base", "appTest", "--table", "tblContacts",
        ])
        .output()
        .unwrap();

    assert_code(&output, 0);
    patch.assert_calls(0);
}

#[test]
fn contacts_auth_failure_exit_51() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v0/appTest/tblContacts");
        then.status(401).json_body(json!({
            "error": { "type": "AUTHENTICATION_REQUIRED", "message": "Invalid authentication token" }
        }));
    });

    let dir = workspace();
    let output = householder(dir.path())
        .env("AIRTABLE_API_BASE", server.base_url())
        .args(["contacts", "--token", "bad", "--base", "appTest", "--table", "tblContacts"])
        .output()
        .unwrap();

    assert_code(&output, 51);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("directory auth failed (401)"), "stderr: {stderr}");
}

#[test]
fn contacts_json_counts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v0/appTest/tblContacts");
        then.status(200).json_body(json!({
            "records": [contact("recJ", "John Smith", &["recM"]), contact("recM", "Mary Smith", &[])]
        }));
    });

    let dir = workspace();
    let output = householder(dir.path())
        .env("AIRTABLE_API_BASE", server.base_url())
        .env("AIRTABLE_ACCESS_TOKEN", "pat_test")
        .env("AIRTABLE_BASE_ID", "appTest")
        .env("AIRTABLE_CONTACTS_TABLE_ID", "tblContacts")
        .args(["contacts", "--json"])
        .output()
        .unwrap();

    assert_code(&output, 0);
    let out: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out, json!({ "contacts": 2, "with_affiliations": 1 }));
}
