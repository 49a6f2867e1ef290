//! File-shaped configuration payloads exchanged through buckets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use muster_relation::{Bucket, fields};

use crate::digest::{Fingerprint, digest_bytes};

/// A named configuration payload with its destination on the consuming
/// host.
///
/// The fingerprint is always recomputed from `bytes`; it is never stored
/// on the struct, so it cannot desynchronize from the content.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
  /// Destination path on the consuming host.
  pub path: PathBuf,
  /// Payload content. The whole file is replaced, never patched.
  pub bytes: Vec<u8>,
  /// Permission bits to set after writing.
  pub mode: Option<u32>,
  /// Owning user name.
  pub owner: Option<String>,
  /// Owning group name.
  pub group: Option<String>,
}

/// Errors decoding an artifact out of a bucket.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
  #[error("bucket is missing required field '{0}'")]
  MissingField(&'static str),

  #[error("payload is not valid base64: {0}")]
  InvalidData(#[from] base64::DecodeError),

  #[error("mode '{0}' is not a valid octal permission string")]
  InvalidMode(String),
}

impl Artifact {
  pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
    Self {
      path: path.into(),
      bytes,
      mode: None,
      owner: None,
      group: None,
    }
  }

  /// Fingerprint of the payload, recomputed on every call.
  pub fn fingerprint(&self) -> Fingerprint {
    digest_bytes(&self.bytes)
  }

  /// Render as bucket fields for publication.
  ///
  /// The transmitted checksum lets transport-constrained consumers decide
  /// staleness without fetching the payload; consumers here recompute
  /// from `data` and never trust it.
  pub fn to_fields(&self) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(fields::DATA.to_string(), BASE64.encode(&self.bytes));
    map.insert(fields::CHECKSUM.to_string(), self.fingerprint().0);
    map.insert(fields::PATH.to_string(), self.path.display().to_string());
    if let Some(mode) = self.mode {
      map.insert(fields::MODE.to_string(), format!("{:04o}", mode));
    }
    if let Some(owner) = &self.owner {
      map.insert(fields::OWNER.to_string(), owner.clone());
    }
    if let Some(group) = &self.group {
      map.insert(fields::GROUP.to_string(), group.clone());
    }
    map
  }

  /// Decode an artifact out of a published bucket.
  ///
  /// Callers must have checked the bucket is published for its relation
  /// kind first; missing required fields here mean the publication
  /// contract was violated.
  pub fn from_bucket(bucket: &Bucket) -> Result<Self, ArtifactError> {
    let data = bucket
      .get(fields::DATA)
      .ok_or(ArtifactError::MissingField(fields::DATA))?;
    let path = bucket
      .get(fields::PATH)
      .ok_or(ArtifactError::MissingField(fields::PATH))?;

    let bytes = BASE64.decode(data)?;

    let mode = match bucket.get(fields::MODE) {
      Some(raw) => Some(parse_mode(raw)?),
      None => None,
    };

    Ok(Self {
      path: PathBuf::from(path),
      bytes,
      mode,
      owner: bucket.get(fields::OWNER).map(str::to_string),
      group: bucket.get(fields::GROUP).map(str::to_string),
    })
  }
}

fn parse_mode(raw: &str) -> Result<u32, ArtifactError> {
  u32::from_str_radix(raw, 8).map_err(|_| ArtifactError::InvalidMode(raw.to_string()))
}
