//! The consuming host's view of its own configuration.
//!
//! `LocalState` is the live view: what the controller reports plus the
//! digest of the artifact currently on disk. `StateStore` persists the
//! last successful apply per relation so `status` can answer without
//! touching the bucket substrate.
//!
//! # Storage layout
//!
//! ```text
//! {state_dir}/
//! ├── auth-key.json           # AppliedRecord
//! └── controller-config.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use muster_relation::RelationKind;

use crate::digest::{Fingerprint, digest_file};
use crate::service::ServiceController;

/// Environment variable overriding the state store location.
pub const STATE_DIR_ENV: &str = "MUSTER_STATE_DIR";

const DEFAULT_STATE_DIR: &str = "/var/lib/muster/state";

/// Live view of the host for one artifact kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalState {
  pub installed: bool,
  pub running: bool,
  /// Fingerprint of the artifact currently on disk; `None` if the file
  /// does not exist yet.
  pub current_digest: Option<Fingerprint>,
}

impl LocalState {
  /// Observe the current state through the controller and the filesystem.
  pub fn observe(
    controller: &dyn ServiceController,
    artifact_path: &Path,
  ) -> Result<Self, io::Error> {
    Ok(Self {
      installed: controller.installed(),
      running: controller.running(),
      current_digest: digest_file(artifact_path)?,
    })
  }
}

/// Record of the last successful apply for one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
  /// Nonce of the publication that was applied.
  pub nonce: String,
  /// Fingerprint the artifact had when it was written.
  pub digest: String,
  /// Unix timestamp (seconds) of the apply.
  pub applied_at: u64,
}

impl AppliedRecord {
  pub fn new(nonce: impl Into<String>, digest: &Fingerprint) -> Self {
    Self {
      nonce: nonce.into(),
      digest: digest.0.clone(),
      applied_at: unix_now(),
    }
  }
}

fn unix_now() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or(0)
}

/// Errors from the state store.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
  #[error("failed to create state directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to read state: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write state: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse state: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Per-relation applied records, persisted as JSON.
#[derive(Debug, Clone)]
pub struct StateStore {
  base_path: PathBuf,
}

impl StateStore {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  /// Store at the default location, honoring `MUSTER_STATE_DIR`.
  pub fn default_store() -> Self {
    if let Ok(path) = std::env::var(STATE_DIR_ENV) {
      return Self::new(PathBuf::from(path));
    }
    Self::new(PathBuf::from(DEFAULT_STATE_DIR))
  }

  fn record_path(&self, kind: RelationKind) -> PathBuf {
    self.base_path.join(format!("{}.json", kind.as_str()))
  }

  /// Load the applied record for a relation, if any apply has succeeded.
  pub fn load(&self, kind: RelationKind) -> Result<Option<AppliedRecord>, StateError> {
    let path = self.record_path(kind);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(StateError::Read(e)),
    };

    let record: AppliedRecord = serde_json::from_str(&content).map_err(StateError::Parse)?;
    Ok(Some(record))
  }

  /// Save the applied record for a relation.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent
  /// corruption.
  pub fn save(&self, kind: RelationKind, record: &AppliedRecord) -> Result<(), StateError> {
    fs::create_dir_all(&self.base_path).map_err(StateError::CreateDir)?;

    let path = self.record_path(kind);
    let temp_path = path.with_extension("json.tmp");

    let content = serde_json::to_string_pretty(record).map_err(StateError::Serialize)?;
    fs::write(&temp_path, &content).map_err(StateError::Write)?;
    fs::rename(&temp_path, &path).map_err(StateError::Write)?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::digest::digest_bytes;
  use crate::testutil::FakeService;
  use serial_test::serial;
  use tempfile::TempDir;

  fn temp_store() -> (TempDir, StateStore) {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().to_path_buf());
    (temp, store)
  }

  #[test]
  fn load_is_none_before_first_apply() {
    let (_temp, store) = temp_store();
    assert!(store.load(RelationKind::AuthKey).unwrap().is_none());
  }

  #[test]
  fn save_then_load_round_trips() {
    let (_temp, store) = temp_store();
    let record = AppliedRecord::new("nonce-1", &digest_bytes(b"key"));

    store.save(RelationKind::AuthKey, &record).unwrap();
    let loaded = store.load(RelationKind::AuthKey).unwrap().unwrap();

    assert_eq!(loaded, record);
  }

  #[test]
  fn records_are_scoped_per_relation() {
    let (_temp, store) = temp_store();
    let record = AppliedRecord::new("nonce-1", &digest_bytes(b"key"));

    store.save(RelationKind::AuthKey, &record).unwrap();
    assert!(store.load(RelationKind::ControllerConfig).unwrap().is_none());
  }

  #[test]
  #[serial]
  fn env_var_overrides_default_path() {
    temp_env::with_vars([(STATE_DIR_ENV, Some("/custom/state"))], || {
      let store = StateStore::default_store();
      assert_eq!(store.base_path, PathBuf::from("/custom/state"));
    });
  }

  #[test]
  fn corrupt_record_is_a_parse_error() {
    let (temp, store) = temp_store();
    fs::write(temp.path().join("auth-key.json"), "garbage").unwrap();

    assert!(matches!(
      store.load(RelationKind::AuthKey),
      Err(StateError::Parse(_))
    ));
  }

  #[test]
  fn observe_reports_missing_artifact_as_no_digest() {
    let temp = TempDir::new().unwrap();
    let controller = FakeService::installed("slurmd");

    let state = LocalState::observe(&controller, &temp.path().join("missing.conf")).unwrap();
    assert!(state.installed);
    assert!(state.current_digest.is_none());
  }

  #[test]
  fn observe_fingerprints_the_artifact_on_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cluster.conf");
    fs::write(&path, b"NodeName=node1").unwrap();
    let controller = FakeService::installed("slurmd");

    let state = LocalState::observe(&controller, &path).unwrap();
    assert_eq!(state.current_digest, Some(digest_bytes(b"NodeName=node1")));
  }
}
