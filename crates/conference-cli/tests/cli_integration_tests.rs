//! CLI integration tests for conference
//!
//! Runs the binary end-to-end against databases and config in a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with data and config isolated under `home`
#[allow(deprecated)]
fn conference_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("conference").unwrap();
    cmd.current_dir(home.path())
        .env("CONFERENCE_DATA_DIR", home.path().join("data"))
        .env("CONFERENCE_CONFIG_DIR", home.path().join("config"))
        .env_remove("RUST_LOG");
    cmd
}

/// Create a conference and return its id
fn create(home: &TempDir, name: &str, date: &str) -> i64 {
    let output = conference_cmd(home)
        .args(["--format", "json", "create", "--name", name, "--date", date])
        .output()
        .unwrap();
    assert!(output.status.success(), "create failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], 201);
    json["body"]["id"].as_i64().expect("created id")
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    conference_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("reindex"));
}

#[test]
fn test_create_and_get() {
    let home = TempDir::new().unwrap();
    let id = create(&home, "AAAAAAAAAA", "1970-01-01T00:00:00Z");

    conference_cmd(&home)
        .args(["get", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("200 OK"))
        .stdout(predicate::str::contains("AAAAAAAAAA"))
        .stdout(predicate::str::contains("1970-01-01T00:00:00+00:00"));
}

#[test]
fn test_create_prints_location() {
    let home = TempDir::new().unwrap();
    conference_cmd(&home)
        .args(["create", "--name", "RustConf", "--date", "2024-09-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("201 Created"))
        .stdout(predicate::str::contains("Location: /api/conferences/1"));
}

#[test]
fn test_search_by_id_and_name() {
    let home = TempDir::new().unwrap();
    let first = create(&home, "RustConf", "2024-09-10");
    create(&home, "EuroRust", "2024-10-10");

    conference_cmd(&home)
        .args(["search", &format!("id:{}", first)])
        .assert()
        .success()
        .stdout(predicate::str::contains("RustConf"))
        .stdout(predicate::str::contains("EuroRust").not());

    conference_cmd(&home)
        .args(["search", "name:eurorust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EuroRust"));
}

#[test]
fn test_patch_keeps_omitted_fields() {
    let home = TempDir::new().unwrap();
    let id = create(&home, "AAAAAAAAAA", "2024-01-01");

    conference_cmd(&home)
        .args(["patch", &id.to_string(), "--date", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AAAAAAAAAA"))
        .stdout(predicate::str::contains("2025-01-01"));
}

#[test]
fn test_update_unknown_id_fails_with_bad_request() {
    let home = TempDir::new().unwrap();
    conference_cmd(&home)
        .args(["update", "42", "--name", "x", "--date", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("400 Bad Request"));
}

#[test]
fn test_unknown_id_status_from_config() {
    let home = TempDir::new().unwrap();
    conference_cmd(&home)
        .args(["config", "set", "api.unknown_id_status", "not_found"])
        .assert()
        .success();

    conference_cmd(&home)
        .args(["patch", "42", "--name", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404 Not Found"));
}

#[test]
fn test_delete_then_get_fails() {
    let home = TempDir::new().unwrap();
    let id = create(&home, "AAAAAAAAAA", "2024-01-01");

    conference_cmd(&home)
        .args(["delete", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("204 No Content"));

    // Deleting again is not an error
    conference_cmd(&home)
        .args(["delete", &id.to_string()])
        .assert()
        .success();

    conference_cmd(&home)
        .args(["get", &id.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404 Not Found"));

    conference_cmd(&home)
        .args(["search", &format!("id:{}", id)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conferences found."));
}

#[test]
fn test_json_error_output() {
    let home = TempDir::new().unwrap();
    let output = conference_cmd(&home)
        .args(["--format", "json", "get", "7"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], 404);
    assert_eq!(json["error_key"], "notfound");
    assert_eq!(json["entity_name"], "conference");
}

#[test]
fn test_list_and_reindex() {
    let home = TempDir::new().unwrap();
    create(&home, "One", "2024-01-01");
    create(&home, "Two", "2024-02-01");

    conference_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("One"))
        .stdout(predicate::str::contains("Two"));

    conference_cmd(&home)
        .arg("reindex")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 2 conferences (0 failed)"));
}

#[test]
fn test_invalid_date_is_rejected() {
    let home = TempDir::new().unwrap();
    conference_cmd(&home)
        .args(["create", "--name", "x", "--date", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_config_commands() {
    let home = TempDir::new().unwrap();

    conference_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    conference_cmd(&home)
        .args(["config", "set", "api.application_name", "testApp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set api.application_name = testApp"));

    conference_cmd(&home)
        .args(["config", "get", "api.application_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("testApp"));

    conference_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.unknown_id_status = bad_request"));

    conference_cmd(&home)
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
