//! Smoke tests for the musterd binary.
//!
//! Each test runs the binary in an isolated environment: relation and
//! state stores live under a per-test temp directory, and artifact
//! paths in the config point into it too, so nothing on the host is
//! touched.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Write an isolated agent config into `dir` and return its path.
fn write_config(dir: &Path) -> std::path::PathBuf {
  let config_path = dir.join("config.toml");
  let content = format!(
    r#"
[auth]
service = "muster-test-auth"
package = "muster-test-auth"
artifact_path = "{dir}/auth.key"

[compute]
service = "muster-test-compute"
package = "muster-test-compute"
artifact_path = "{dir}/cluster.conf"
"#,
    dir = dir.display()
  );
  fs::write(&config_path, content).unwrap();
  config_path
}

fn musterd(temp: &TempDir) -> Command {
  let mut cmd = Command::cargo_bin("musterd").unwrap();
  cmd
    .env("MUSTER_RELATION_DIR", temp.path().join("relations"))
    .env("MUSTER_STATE_DIR", temp.path().join("state"));
  cmd
}

#[test]
fn help_lists_subcommands() {
  Command::cargo_bin("musterd")
    .unwrap()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("install"))
    .stdout(predicate::str::contains("sync"))
    .stdout(predicate::str::contains("publish-facts"))
    .stdout(predicate::str::contains("status"));
}

#[test]
fn sync_rejects_unknown_relations() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "sync", "auth-munge"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown relation"));
}

#[test]
fn sync_rejects_the_produced_relation() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "sync", "compute-facts"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("publish-facts"));
}

#[test]
fn sync_reports_not_ready_when_nothing_is_published() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "sync", "auth-key"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Authentication key is not ready"))
    .stdout(predicate::str::contains("auth-key: not ready"));

  // Nothing may have been written.
  assert!(!temp.path().join("auth.key").exists());
}

#[test]
fn sync_surfaces_service_not_installed_before_touching_files() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  // Seed a complete publication from the controller. The payload is
  // base64("key material").
  let bucket_dir = temp.path().join("relations/auth-key");
  fs::create_dir_all(&bucket_dir).unwrap();
  let doc = format!(
    r#"{{
  "nonce": "abc",
  "fields": {{
    "data": "a2V5IG1hdGVyaWFs",
    "checksum": "ignored",
    "path": "{}"
  }}
}}"#,
    temp.path().join("auth.key").display()
  );
  fs::write(bucket_dir.join("slurm-server.json"), doc).unwrap();

  // The test service's package is never installed, so the apply cycle
  // must stop at the install gate, surfaced as a status.
  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "sync", "auth-key"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("muster-test-auth is not installed"));

  assert!(!temp.path().join("auth.key").exists());
}

#[test]
fn publish_facts_writes_a_bucket() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "publish-facts"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Host facts published"));

  // The default unit name is muster/0, flattened on disk.
  let bucket = temp.path().join("relations/compute-facts/muster_0.json");
  assert!(bucket.exists());
  let content = fs::read_to_string(bucket).unwrap();
  assert!(content.contains("hostname"));
  assert!(content.contains("cpu_count"));
}

#[test]
fn status_reports_on_an_untouched_host() {
  let temp = TempDir::new().unwrap();
  let config = write_config(temp.path());

  musterd(&temp)
    .args(["--config", config.to_str().unwrap(), "status"])
    .assert()
    .success()
    .stdout(predicate::str::contains("muster-test-auth (auth-key)"))
    .stdout(predicate::str::contains("Applied:   never"))
    .stdout(predicate::str::contains("Host facts"));
}

#[test]
fn bad_config_fails_with_context() {
  let temp = TempDir::new().unwrap();
  let config_path = temp.path().join("config.toml");
  fs::write(&config_path, "[auth]\nservice = 42\n").unwrap();

  musterd(&temp)
    .args(["--config", config_path.to_str().unwrap(), "status"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load config"));
}
