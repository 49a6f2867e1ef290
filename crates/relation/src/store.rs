//! On-disk snapshot of the pub/sub substrate.
//!
//! The substrate delivers each peer's bucket to the local host; this
//! store is the agent's local view of it. Publication writes the nonce
//! and all fields as one document with an atomic temp+rename, so a
//! reader of *this* store never observes a half-written bucket. (Readers
//! must still validate completeness via [`Bucket::publication`], because
//! the remote substrate itself may deliver fields individually.)
//!
//! # Storage layout
//!
//! ```text
//! {relation_dir}/
//! ├── auth-key/
//! │   └── <owner>.json        # BucketDoc: nonce + fields
//! └── compute-facts/
//!     └── <owner>.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::Bucket;
use crate::kind::RelationKind;

/// Environment variable overriding the relation store location.
pub const RELATION_DIR_ENV: &str = "MUSTER_RELATION_DIR";

const DEFAULT_RELATION_DIR: &str = "/var/lib/muster/relations";

/// Errors from the relation store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("failed to create relation directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to read bucket: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write bucket: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse bucket: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize bucket: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Serialized form of a bucket. The owner is implied by the file name.
#[derive(Debug, Serialize, Deserialize)]
struct BucketDoc {
  nonce: String,
  fields: BTreeMap<String, String>,
}

/// File-backed store of relation buckets.
#[derive(Debug, Clone)]
pub struct RelationStore {
  base_path: PathBuf,
}

impl RelationStore {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  /// Store at the default location, honoring `MUSTER_RELATION_DIR`.
  pub fn default_store() -> Self {
    if let Ok(path) = std::env::var(RELATION_DIR_ENV) {
      return Self::new(PathBuf::from(path));
    }
    Self::new(PathBuf::from(DEFAULT_RELATION_DIR))
  }

  pub fn base_path(&self) -> &PathBuf {
    &self.base_path
  }

  fn relation_dir(&self, kind: RelationKind) -> PathBuf {
    self.base_path.join(kind.as_str())
  }

  fn bucket_path(&self, kind: RelationKind, owner: &str) -> PathBuf {
    // Peer identities may contain '/' (unit names); flatten for the filesystem.
    let file = format!("{}.json", owner.replace('/', "_"));
    self.relation_dir(kind).join(file)
  }

  /// Read the current snapshot of a peer's bucket.
  ///
  /// A missing file is a bucket nobody has published to yet, which is a
  /// normal state: returns an uninitialized bucket, not an error.
  pub fn read(&self, kind: RelationKind, owner: &str) -> Result<Bucket, StoreError> {
    let path = self.bucket_path(kind, owner);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(relation = %kind, owner, "no bucket on disk, treating as uninitialized");
        return Ok(Bucket::new(owner));
      }
      Err(e) => return Err(StoreError::Read(e)),
    };

    let doc: BucketDoc = serde_json::from_str(&content).map_err(StoreError::Parse)?;
    Ok(Bucket::published(owner, doc.nonce, doc.fields))
  }

  /// Publish nonce and fields as one unit into the owner's bucket.
  ///
  /// Uses atomic write (write to temp, then rename) so readers of this
  /// store see either the previous publication or the new one, never a
  /// mixture.
  pub fn publish(
    &self,
    kind: RelationKind,
    owner: &str,
    nonce: &str,
    fields: BTreeMap<String, String>,
  ) -> Result<(), StoreError> {
    let dir = self.relation_dir(kind);
    fs::create_dir_all(&dir).map_err(StoreError::CreateDir)?;
    let path = self.bucket_path(kind, owner);

    let doc = BucketDoc {
      nonce: nonce.to_string(),
      fields,
    };
    let content = serde_json::to_string_pretty(&doc).map_err(StoreError::Serialize)?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(StoreError::Write)?;
    fs::rename(&temp_path, &path).map_err(StoreError::Write)?;

    debug!(relation = %kind, owner, nonce, "bucket published");
    Ok(())
  }
}
