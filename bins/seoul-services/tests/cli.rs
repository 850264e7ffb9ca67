//! End-to-end tests for the commands that work offline.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("seoul-services").unwrap();
    cmd.env_remove("SEOUL_SERVICES_FAVORITES")
        .env_remove("SEOUL_SERVICES_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn records_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("records.json");
    let body = serde_json::json!({
        "success": true,
        "locations": [
            { "id": "lib-1", "_table": "libraries", "lbrry_name": "서울도서관", "lat": 37.5665, "lon": 126.978 },
            { "id": "lib-2", "_table": "libraries", "lbrry_name": "남산도서관", "lat": 37.5672, "lon": 126.9788 },
            { "id": "evt-1", "category": "cultural_events", "title": "재즈 페스티벌", "lat": 37.60, "lon": 127.05 },
            { "id": "broken", "title": "No position" }
        ]
    });
    fs::write(&path, body.to_string()).unwrap();
    path
}

#[test]
fn test_distance_formats_kilometers() {
    cmd()
        .args(["distance", "37.5665", "126.978", "37.5765", "126.978"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1.1km"));
}

#[test]
fn test_distance_rejects_non_finite() {
    cmd()
        .args(["distance", "NaN", "126.978", "37.5", "127.0"])
        .assert()
        .code(2);
}

#[test]
fn test_clusters_json_merges_nearby_libraries() {
    let dir = TempDir::new().unwrap();
    let file = records_file(&dir);

    cmd()
        .arg("clusters")
        .arg(&file)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lib-1-lib-2\""))
        .stdout(predicate::str::contains("\"evt-1\""))
        .stdout(predicate::str::contains("broken").not());
}

#[test]
fn test_clusters_click_zooms_into_cluster() {
    let dir = TempDir::new().unwrap();
    let file = records_file(&dir);

    cmd()
        .arg("clusters")
        .arg(&file)
        .args(["--click", "lib-1-lib-2", "--zoom", "6", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\": \"zoom\""))
        .stdout(predicate::str::contains("\"level\": 4"));
}

#[test]
fn test_clusters_click_selects_entity() {
    let dir = TempDir::new().unwrap();
    let file = records_file(&dir);

    cmd()
        .arg("clusters")
        .arg(&file)
        .args(["--click", "evt-1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\": \"select\""))
        .stdout(predicate::str::contains("\"overlay\": \"evt-1\""));
}

#[test]
fn test_clusters_rejects_negative_threshold() {
    let dir = TempDir::new().unwrap();
    let file = records_file(&dir);

    cmd()
        .arg("clusters")
        .arg(&file)
        .arg("--threshold=-1")
        .assert()
        .code(2);
}

#[test]
fn test_missing_config_file() {
    cmd()
        .args(["--config", "/nonexistent/seoul-services.toml", "distance", "0", "0", "0", "0"])
        .assert()
        .code(3);
}

#[test]
fn test_favorites_roundtrip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("nested").join("favorites.json");
    let file = file.to_str().unwrap();

    cmd()
        .args(["favorites", "--file", file, "add", "lib-1", "서울도서관", "libraries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 서울도서관"));

    cmd()
        .args(["favorites", "--file", file, "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"addedAt\""))
        .stdout(predicate::str::contains("\"category\": \"libraries\""));

    cmd()
        .args(["favorites", "--file", file, "toggle", "lib-1", "서울도서관", "libraries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    cmd()
        .args(["favorites", "list", "--json"])
        .env("SEOUL_SERVICES_FAVORITES", file)
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_favorites_rejects_unknown_category() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("favorites.json");

    cmd()
        .arg("favorites")
        .arg("--file")
        .arg(&file)
        .args(["add", "x", "Somewhere", "museums"])
        .assert()
        .failure();
    assert!(!file.exists());
}

#[test]
fn test_corrupt_favorites_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("favorites.json");
    fs::write(&file, "{ not json").unwrap();

    cmd()
        .arg("favorites")
        .arg("--file")
        .arg(&file)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("favorites"));
}
