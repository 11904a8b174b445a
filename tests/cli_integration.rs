//! Integration tests for the coref-scorer binary.
//!
//! Every invocation passes an explicit `--config` so the user's own config
//! file never leaks into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn scorer() -> Command {
    Command::cargo_bin("coref-scorer").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Empty config file: built-in defaults.
fn empty_config(dir: &Path) -> PathBuf {
    write(dir, "config.toml", "")
}

// =============================================================================
// score
// =============================================================================

#[test]
fn test_score_file_pair_text() {
    let dir = TempDir::new().unwrap();
    let key = write(dir.path(), "key.txt", "1 0\n2 0\n3 0\n4 1\n");
    let response = write(dir.path(), "response.txt", "1 5\n2 5\n3 6\n4 6\n");
    let config = empty_config(dir.path());

    scorer()
        .arg("score")
        .arg("--key")
        .arg(&key)
        .arg("--response")
        .arg(&response)
        .arg("--config")
        .arg(&config)
        .args(["-m", "muc", "-m", "b-cubed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("muc"))
        .stdout(predicate::str::contains("50.00"))
        .stdout(predicate::str::contains("b-cubed"));
}

#[test]
fn test_score_json_output() {
    let dir = TempDir::new().unwrap();
    let key = write(dir.path(), "key.txt", "1 0\n2 0\n");
    let response = write(dir.path(), "response.txt", "1 9\n2 9\n");
    let config = empty_config(dir.path());

    let output = scorer()
        .args(["score", "--format", "json", "--per-doc"])
        .arg("-k")
        .arg(&key)
        .arg("-r")
        .arg(&response)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["documents"], 1);
    assert_eq!(report["per_document"][0]["doc_id"], "key.txt");
    let conll = report["conll_f1"].as_f64().unwrap();
    assert!((conll - 1.0).abs() < 1e-9);
}

#[test]
fn test_score_directories_lenient_and_strict() {
    let dir = TempDir::new().unwrap();
    let keys = dir.path().join("key");
    let responses = dir.path().join("response");
    fs::create_dir(&keys).unwrap();
    fs::create_dir(&responses).unwrap();
    write(&keys, "a.txt", "1 0\n2 0\n");
    write(&responses, "a.txt", "1 0\n2 0\n");
    write(&keys, "b.txt", "1 0\n2 0\n");
    write(&responses, "b.txt", "1 0\nnot a line\n");
    let config = empty_config(dir.path());

    scorer()
        .arg("score")
        .arg("--key")
        .arg(&keys)
        .arg("--response")
        .arg(&responses)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("b.txt"));

    scorer()
        .arg("score")
        .arg("--key")
        .arg(&keys)
        .arg("--response")
        .arg(&responses)
        .arg("--config")
        .arg(&config)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("b.txt"))
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_score_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let key = write(dir.path(), "key.txt", "1 0\n2 0\n");
    let response = write(dir.path(), "response.txt", "1 0\n2 1\n");
    let config = empty_config(dir.path());
    let out = dir.path().join("report.json");

    scorer()
        .arg("score")
        .arg("-k")
        .arg(&key)
        .arg("-r")
        .arg(&response)
        .arg("--config")
        .arg(&config)
        .args(["-f", "json", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["metrics"][0]["metric"], "muc");
}

#[test]
fn test_score_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    scorer()
        .args(["score", "-k", "/nonexistent/key.txt", "-r", "/nonexistent/response.txt"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_config_file_selects_metrics() {
    let dir = TempDir::new().unwrap();
    let key = write(dir.path(), "key.txt", "1 0\n2 0\n3 1\n");
    let response = write(dir.path(), "response.txt", "1 0\n2 1\n3 1\n");
    let config = write(dir.path(), "custom.toml", "metrics = [\"blanc\", \"krippendorff-alpha\"]\n");

    scorer()
        .arg("score")
        .arg("-k")
        .arg(&key)
        .arg("-r")
        .arg(&response)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("blanc"))
        .stdout(predicate::str::contains("krippendorff-alpha"))
        .stdout(predicate::str::contains("ceaf").not());
}

#[test]
fn test_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let key = write(dir.path(), "key.txt", "1 0\n");
    let config = write(dir.path(), "bad.toml", "metrics = []\n");
    scorer()
        .arg("score")
        .arg("-k")
        .arg(&key)
        .arg("-r")
        .arg(&key)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no metrics selected"));
}

// =============================================================================
// align
// =============================================================================

#[test]
fn test_align_jsonl() {
    let dir = TempDir::new().unwrap();
    let docs = write(
        dir.path(),
        "docs.jsonl",
        concat!(
            r#"{"doc_id": "d1", "text": "The dog saw the cat. It ran.", "#,
            r#""gold": [{"id": 1, "span": {"start": 0, "end": 7}, "cluster": 1}, "#,
            r#"{"id": 2, "span": {"start": 21, "end": 23}, "cluster": 1}], "#,
            r#""response": [{"id": 8, "span": {"start": 4, "end": 7}, "cluster": 4}, "#,
            r#"{"id": 9, "span": {"start": 21, "end": 23}, "cluster": 4}]}"#,
            "\n"
        ),
    );
    let config = empty_config(dir.path());

    scorer()
        .arg("align")
        .arg("--input")
        .arg(&docs)
        .args(["--policy", "muc", "--per-doc"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Alignment: matched 2/2"))
        .stdout(predicate::str::contains("d1: conll 100.00"));
}

// =============================================================================
// config
// =============================================================================

#[test]
fn test_config_shows_effective_toml() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "c.toml", "policy = \"uw\"\n");
    scorer()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("policy = \"uw\""))
        .stdout(predicate::str::contains("max_assignment_dim = 4096"));
}

#[test]
fn test_help_lists_commands() {
    scorer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("align"));
}
