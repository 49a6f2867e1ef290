//! The digest-gated configuration synchronizer.
//!
//! On a bucket-changed notification the synchronizer classifies the
//! bucket (NotReady / UpToDate / NeedsUpdate) and, when the published
//! artifact differs from local content, performs the guarded replace:
//!
//! 1. require the dependent service to be installed
//! 2. stop the service
//! 3. replace the whole file, apply mode/ownership
//! 4. verify the written bytes hash to the expected fingerprint
//! 5. start the service
//! 6. persist the applied record
//!
//! Stop always precedes the write and start always follows the verify,
//! so a failure anywhere in between leaves the service stopped rather
//! than running against unknown configuration. A start failure after a
//! successful write keeps the new artifact on disk: config applied,
//! restart surfaced as the error.
//!
//! Everything runs to completion synchronously; the hosting dispatcher
//! delivers one event at a time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use muster_relation::{
  Bucket, HostFacts, NonceGenerator, Publication, RelationKind, RelationStore, StoreError,
};

use crate::artifact::{Artifact, ArtifactError};
use crate::digest::{Fingerprint, digest_file};
use crate::report::{StatusSink, SyncEvent, render};
use crate::service::{ServiceController, ServiceError};
use crate::state::{AppliedRecord, StateError, StateStore};

/// What a bucket-changed notification amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
  /// The peer has not completed a publication; retry happens naturally
  /// on the next change notification.
  NotReady,
  /// Local content already matches the publication.
  UpToDate,
  /// The publication differs from local content; apply it.
  NeedsUpdate,
}

/// Result of handling one bucket-changed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
  NotReady,
  UpToDate,
  Updated,
}

impl std::fmt::Display for SyncOutcome {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      SyncOutcome::NotReady => "not ready",
      SyncOutcome::UpToDate => "up to date",
      SyncOutcome::Updated => "updated",
    };
    f.write_str(s)
  }
}

/// Errors from a sync cycle. All of them are also surfaced through the
/// status sink before they propagate.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  /// Apply attempted before the dependent service package is present.
  /// Installation is a distinct lifecycle phase; the synchronizer never
  /// installs on its own.
  #[error("{service} is not installed")]
  ServiceNotInstalled { service: String },

  #[error("failed to stop {service}: {source}")]
  StopFailed {
    service: String,
    #[source]
    source: ServiceError,
  },

  /// The artifact was written but the service did not come back up.
  /// The new configuration stays on disk.
  #[error("{service} failed to start after update: {source}")]
  StartFailed {
    service: String,
    #[source]
    source: ServiceError,
  },

  /// Post-write verification failed: the bytes on disk do not hash to
  /// the published fingerprint. The service is left stopped.
  #[error("written file {path} does not match expected digest (expected {expected}, got {actual})")]
  DigestMismatch {
    path: PathBuf,
    expected: Fingerprint,
    actual: Fingerprint,
  },

  #[error("failed to set ownership on {path}: {message}")]
  Ownership { path: PathBuf, message: String },

  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error("relation store error: {0}")]
  Store(#[from] StoreError),

  #[error("state store error: {0}")]
  State(#[from] StateError),

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Converges one relation's artifact with the peer's publication.
pub struct ConfigSynchronizer<'a> {
  kind: RelationKind,
  controller: &'a mut dyn ServiceController,
  state: &'a StateStore,
  sink: &'a mut dyn StatusSink,
}

impl<'a> ConfigSynchronizer<'a> {
  pub fn new(
    kind: RelationKind,
    controller: &'a mut dyn ServiceController,
    state: &'a StateStore,
    sink: &'a mut dyn StatusSink,
  ) -> Self {
    Self {
      kind,
      controller,
      state,
      sink,
    }
  }

  /// Classify a bucket. Deterministic and total: every bucket maps to
  /// exactly one decision.
  ///
  /// The local side of the comparison is the digest of the artifact's
  /// own declared destination path; the transmitted checksum field is
  /// never consulted.
  pub fn evaluate(&self, bucket: &Bucket) -> Result<SyncDecision, SyncError> {
    match bucket.publication(self.kind) {
      Publication::Uninitialized => Ok(SyncDecision::NotReady),
      Publication::Partial { missing } => {
        // Mid-publish read: nonce landed before the rest of the fields.
        debug!(relation = %self.kind, ?missing, "bucket is partially published");
        Ok(SyncDecision::NotReady)
      }
      Publication::Published => {
        let artifact = Artifact::from_bucket(bucket)?;
        let remote = artifact.fingerprint();
        let local = digest_file(&artifact.path)?;

        if local.as_ref() == Some(&remote) {
          Ok(SyncDecision::UpToDate)
        } else {
          Ok(SyncDecision::NeedsUpdate)
        }
      }
    }
  }

  /// Handle one bucket-changed notification end to end.
  pub fn on_bucket_changed(&mut self, bucket: &Bucket) -> Result<SyncOutcome, SyncError> {
    self.emit(&SyncEvent::ChangeDetected(self.kind));
    info!(relation = %self.kind, owner = %bucket.owner, nonce = %bucket.nonce, "bucket changed");

    let result = self.converge(bucket);
    if let Err(e) = &result {
      warn!(relation = %self.kind, error = %e, "sync cycle failed");
      let event = self.failure_event(e);
      self.emit(&event);
    }
    result
  }

  fn converge(&mut self, bucket: &Bucket) -> Result<SyncOutcome, SyncError> {
    match self.evaluate(bucket)? {
      SyncDecision::NotReady => {
        self.emit(&SyncEvent::NotReady(self.kind));
        Ok(SyncOutcome::NotReady)
      }
      SyncDecision::UpToDate => {
        self.emit(&SyncEvent::UpToDate(self.kind));
        Ok(SyncOutcome::UpToDate)
      }
      SyncDecision::NeedsUpdate => {
        let artifact = Artifact::from_bucket(bucket)?;
        self.apply(&artifact)?;

        let record = AppliedRecord::new(&bucket.nonce, &artifact.fingerprint());
        self.state.save(self.kind, &record)?;

        self.emit(&SyncEvent::Updated(self.kind));
        Ok(SyncOutcome::Updated)
      }
    }
  }

  /// Guarded replace: stop → write → verify → start.
  fn apply(&mut self, artifact: &Artifact) -> Result<(), SyncError> {
    let service = self.controller.name().to_string();

    if !self.controller.installed() {
      return Err(SyncError::ServiceNotInstalled { service });
    }

    debug!(service = %service, path = %artifact.path.display(), "stopping service to replace artifact");
    self
      .controller
      .stop()
      .map_err(|source| SyncError::StopFailed {
        service: service.clone(),
        source,
      })?;

    write_artifact(artifact)?;

    let expected = artifact.fingerprint();
    let actual = digest_file(&artifact.path)?.ok_or_else(|| {
      io::Error::new(io::ErrorKind::NotFound, "artifact vanished after write")
    })?;
    if actual != expected {
      return Err(SyncError::DigestMismatch {
        path: artifact.path.clone(),
        expected,
        actual,
      });
    }

    debug!(service = %service, "artifact verified, starting service");
    self
      .controller
      .start()
      .map_err(|source| SyncError::StartFailed { service, source })?;

    Ok(())
  }

  fn emit(&mut self, event: &SyncEvent) {
    self.sink.emit(&render(event));
  }

  fn failure_event(&self, err: &SyncError) -> SyncEvent {
    match err {
      SyncError::ServiceNotInstalled { service } => {
        SyncEvent::ServiceNotInstalled(self.kind, service.clone())
      }
      SyncError::StartFailed { service, .. } => SyncEvent::StartFailed(self.kind, service.clone()),
      other => SyncEvent::ApplyFailed(self.kind, other.to_string()),
    }
  }
}

/// Replace the artifact file wholesale and apply mode/ownership.
fn write_artifact(artifact: &Artifact) -> Result<(), SyncError> {
  if let Some(parent) = artifact.path.parent()
    && !parent.exists()
  {
    fs::create_dir_all(parent)?;
  }

  fs::write(&artifact.path, &artifact.bytes)?;

  if let Some(mode) = artifact.mode {
    set_permissions(&artifact.path, mode)?;
  }
  if artifact.owner.is_some() || artifact.group.is_some() {
    set_ownership(&artifact.path, artifact.owner.as_deref(), artifact.group.as_deref())?;
  }

  Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<(), SyncError> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
  Ok(())
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<(), SyncError> {
  Ok(())
}

#[cfg(unix)]
fn set_ownership(path: &Path, owner: Option<&str>, group: Option<&str>) -> Result<(), SyncError> {
  use nix::unistd::{Gid, Group, Uid, User, chown};

  let ownership_err = |message: String| SyncError::Ownership {
    path: path.to_path_buf(),
    message,
  };

  let uid: Option<Uid> = match owner {
    Some(name) => Some(
      User::from_name(name)
        .map_err(|e| ownership_err(e.to_string()))?
        .ok_or_else(|| ownership_err(format!("unknown user '{}'", name)))?
        .uid,
    ),
    None => None,
  };

  let gid: Option<Gid> = match group {
    Some(name) => Some(
      Group::from_name(name)
        .map_err(|e| ownership_err(e.to_string()))?
        .ok_or_else(|| ownership_err(format!("unknown group '{}'", name)))?
        .gid,
    ),
    None => None,
  };

  chown(path, uid, gid).map_err(|e| ownership_err(e.to_string()))
}

#[cfg(not(unix))]
fn set_ownership(_path: &Path, _owner: Option<&str>, _group: Option<&str>) -> Result<(), SyncError> {
  Ok(())
}

/// Publish this unit's host facts under a fresh nonce.
///
/// The self-publication path is freshness-stamped, not change-gated:
/// there is no digest comparison, and publication happens on every
/// triggering event.
pub fn publish_facts(
  store: &RelationStore,
  owner: &str,
  facts: &HostFacts,
  nonces: &mut dyn NonceGenerator,
  sink: &mut dyn StatusSink,
) -> Result<String, SyncError> {
  sink.emit(&render(&SyncEvent::PublishingFacts));

  let nonce = nonces.generate();
  store.publish(RelationKind::ComputeFacts, owner, &nonce, facts.to_fields())?;

  info!(owner, nonce = %nonce, hostname = %facts.hostname, "host facts published");
  sink.emit(&render(&SyncEvent::FactsPublished));
  Ok(nonce)
}
