//! CLI integration tests for Sherpa.
//!
//! These tests run the `sherpa` binary against manifest trees written into
//! temporary directories.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the sherpa binary command, isolated from the user's global config.
fn sherpa(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sherpa").unwrap();
    cmd.env("HOME", home)
        .env_remove("SHERPA_TARGET")
        .arg("--no-color");
    cmd
}

/// Create a temporary directory for test workspaces.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Write `<dir>/sherpa.json` for a manifest with internal dependencies.
fn manifest(root: &Path, name: &str, deps: &[&str]) {
    let deps: Vec<String> = deps
        .iter()
        .map(|d| format!(r#"{{"name": "{}", "type": "workspace"}}"#, d))
        .collect();
    write(
        root,
        &format!("{}/sherpa.json", name),
        &format!(
            r#"{{"name": "{}", "version": "1.0.0", "dependencies": [{}]}}"#,
            name,
            deps.join(", ")
        ),
    );
}

// ============================================================================
// sherpa check
// ============================================================================

#[test]
fn test_check_clean_workspace() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "app", &["core"]);
    manifest(&ws, "core", &[]);

    sherpa(tmp.path())
        .arg("check")
        .arg(&ws)
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked 2 manifest(s): 2 valid, 0 error(s)"));
}

#[test]
fn test_check_reports_cycle_and_fails() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "a", &["b"]);
    manifest(&ws, "b", &["c"]);
    manifest(&ws, "c", &["a"]);

    sherpa(tmp.path())
        .arg("check")
        .arg(&ws)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "error[201]: circular dependency: a -> b -> c -> a",
        ))
        .stdout(predicate::str::contains("sherpa check --format json"));
}

#[test]
fn test_check_reports_missing_dependency() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "a", &["ghost"]);

    sherpa(tmp.path())
        .arg("check")
        .arg(&ws)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[200]"))
        .stdout(predicate::str::contains("`a` depends on `ghost`"));
}

#[test]
fn test_check_json_output() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "core", &[]);
    write(&ws, "broken/sherpa.json", "{ nope");

    let output = sherpa(tmp.path())
        .args(["check", "--format", "json"])
        .arg(&ws)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["manifests"]["core"]["errors"], serde_json::json!([]));
    assert_eq!(report["load_failures"][0]["error"]["code"], 401);
    assert_eq!(report["summary"]["manifests"], 1);
}

#[test]
fn test_check_json_is_deterministic() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "a", &["b", "ghost"]);
    manifest(&ws, "b", &["a"]);
    manifest(&ws, "c", &["c"]);

    let run = |jobs: &str| {
        sherpa(tmp.path())
            .args(["check", "--format", "json", "--jobs", jobs])
            .arg(&ws)
            .output()
            .unwrap()
            .stdout
    };

    assert_eq!(run("1"), run("4"));
}

#[test]
fn test_check_custom_target_from_env() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    write(&ws, "pkg/package.json", r#"{"name": "pkg", "version": ""}"#);

    sherpa(tmp.path())
        .env("SHERPA_TARGET", "package.json")
        .arg("check")
        .arg(&ws)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[100]"));
}

#[test]
fn test_check_project_config() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    write(
        &ws,
        ".sherpa/config.toml",
        "[validate]\nlicenses = [\"MIT\"]\n",
    );
    write(
        &ws,
        "pkg/sherpa.json",
        r#"{"name": "pkg", "version": "1.0.0", "license": "GPL-3.0"}"#,
    );

    sherpa(tmp.path())
        .arg("check")
        .arg(&ws)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[102]"))
        .stdout(predicate::str::contains("field: license"));
}

#[test]
fn test_check_empty_workspace() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    fs::create_dir_all(&ws).unwrap();

    sherpa(tmp.path())
        .arg("check")
        .arg(&ws)
        .assert()
        .success()
        .stdout(predicate::str::contains("no `sherpa.json` manifests found"));

    sherpa(tmp.path())
        .args(["check", "--require-manifests"])
        .arg(&ws)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: no `sherpa.json` manifests found"));
}

#[test]
fn test_check_empty_target_is_rejected() {
    let tmp = temp_dir();

    sherpa(tmp.path())
        .args(["check", "--target", ""])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no manifest file name to look for"));
}

// ============================================================================
// sherpa scan
// ============================================================================

#[test]
fn test_scan_lists_manifests() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "b", &[]);
    manifest(&ws, "a", &[]);
    write(&ws, "a/nested/sherpa.json", "{}");
    write(&ws, ".git/sherpa.json", "{}");
    write(&ws, "a/readme.md", "hi");

    sherpa(tmp.path())
        .arg("scan")
        .arg(&ws)
        .assert()
        .success()
        .stdout(predicate::eq(
            "a/nested/sherpa.json\na/sherpa.json\nb/sherpa.json\n",
        ));
}

// ============================================================================
// sherpa graph
// ============================================================================

#[test]
fn test_graph_prints_edges() {
    let tmp = temp_dir();
    let ws = tmp.path().join("ws");
    manifest(&ws, "app", &["core", "util"]);
    manifest(&ws, "util", &["core"]);
    manifest(&ws, "core", &[]);

    sherpa(tmp.path())
        .arg("graph")
        .arg(&ws)
        .assert()
        .success()
        .stdout(predicate::eq("app -> core\napp -> util\nutil -> core\n"));
}

#[test]
fn test_help_lists_commands() {
    let tmp = temp_dir();

    sherpa(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("graph"));
}
