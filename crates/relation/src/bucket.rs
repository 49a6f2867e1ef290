//! Peer-scoped publication buckets.
//!
//! A bucket is one peer's set of published fields plus the nonce that
//! marks the publication as complete. The underlying substrate may write
//! fields individually, so a reader must never trust a non-empty nonce
//! alone: a bucket counts as published only when the nonce is set AND
//! every field the relation kind requires is present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::RelationKind;

/// Well-known bucket field names.
pub mod fields {
  /// Artifact payload, base64-encoded.
  pub const DATA: &str = "data";
  /// Transmitted payload checksum. Advisory only; consumers recompute.
  pub const CHECKSUM: &str = "checksum";
  /// Destination path on the consuming host.
  pub const PATH: &str = "path";
  /// Octal permission bits, e.g. "0400".
  pub const MODE: &str = "mode";
  /// Owning user name.
  pub const OWNER: &str = "owner";
  /// Owning group name.
  pub const GROUP: &str = "group";

  pub const HOSTNAME: &str = "hostname";
  pub const IP_ADDRESS: &str = "ip_address";
  pub const CPU_COUNT: &str = "cpu_count";
  pub const FREE_MEMORY: &str = "free_memory";
}

/// Completeness of a bucket as seen by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
  /// The owning peer has not published anything yet (`nonce == ""`).
  Uninitialized,
  /// The nonce is set but required fields are missing; the reader caught
  /// the bucket mid-publish. Not ready, never ready-with-defaults.
  Partial { missing: Vec<&'static str> },
  /// Nonce set and all required fields present.
  Published,
}

/// One peer's bucket: nonce plus named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
  /// Peer identity that owns (writes) this bucket.
  pub owner: String,
  /// Freshness token. Empty means "not yet published".
  pub nonce: String,
  fields: BTreeMap<String, String>,
}

impl Bucket {
  /// An uninitialized bucket for the given owner.
  pub fn new(owner: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      nonce: String::new(),
      fields: BTreeMap::new(),
    }
  }

  /// A bucket carrying a complete publication.
  pub fn published(
    owner: impl Into<String>,
    nonce: impl Into<String>,
    fields: BTreeMap<String, String>,
  ) -> Self {
    Self {
      owner: owner.into(),
      nonce: nonce.into(),
      fields,
    }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.fields.get(name).map(String::as_str)
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.fields.insert(name.into(), value.into());
  }

  pub fn fields(&self) -> &BTreeMap<String, String> {
    &self.fields
  }

  /// Classify this bucket against the field contract of `kind`.
  pub fn publication(&self, kind: RelationKind) -> Publication {
    if self.nonce.is_empty() {
      return Publication::Uninitialized;
    }

    let missing: Vec<&'static str> = kind
      .required_fields()
      .iter()
      .copied()
      .filter(|name| !self.fields.contains_key(*name))
      .collect();

    if missing.is_empty() {
      Publication::Published
    } else {
      Publication::Partial { missing }
    }
  }
}
