//! The closed set of relations this agent participates in.
//!
//! Each kind fixes the relation name on the wire and the set of bucket
//! fields a publication must carry before a reader may treat it as
//! complete. Dispatch is a compile-time-checked `match` everywhere; there
//! is no runtime registry of relation handlers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bucket::fields;

/// A relation the agent participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
  /// The controller publishes the cluster authentication key; this unit
  /// consumes it.
  AuthKey,
  /// The controller publishes the compute daemon configuration file; this
  /// unit consumes it.
  ControllerConfig,
  /// This unit publishes its own host facts for the controller to read.
  ComputeFacts,
}

impl RelationKind {
  /// The relation name as used on the wire and in store paths.
  pub const fn as_str(&self) -> &'static str {
    match self {
      RelationKind::AuthKey => "auth-key",
      RelationKind::ControllerConfig => "controller-config",
      RelationKind::ComputeFacts => "compute-facts",
    }
  }

  /// Fields that must be present (besides the nonce) before a bucket of
  /// this kind counts as published.
  pub fn required_fields(&self) -> &'static [&'static str] {
    match self {
      RelationKind::AuthKey | RelationKind::ControllerConfig => {
        &[fields::DATA, fields::CHECKSUM, fields::PATH]
      }
      RelationKind::ComputeFacts => &[
        fields::HOSTNAME,
        fields::IP_ADDRESS,
        fields::CPU_COUNT,
        fields::FREE_MEMORY,
      ],
    }
  }

  /// Whether this unit consumes the peer's publication (as opposed to
  /// producing its own).
  pub const fn is_consumed(&self) -> bool {
    matches!(self, RelationKind::AuthKey | RelationKind::ControllerConfig)
  }
}

impl fmt::Display for RelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RelationKind {
  type Err = UnknownRelation;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "auth-key" => Ok(RelationKind::AuthKey),
      "controller-config" => Ok(RelationKind::ControllerConfig),
      "compute-facts" => Ok(RelationKind::ComputeFacts),
      other => Err(UnknownRelation(other.to_string())),
    }
  }
}

/// A relation name that is not part of the closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown relation: {0}")]
pub struct UnknownRelation(pub String);
