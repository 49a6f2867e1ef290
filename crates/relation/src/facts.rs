//! Host facts a compute node publishes about itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::fields;

/// The facts the controller needs to register this host as a compute node.
///
/// These are live values probed at publication time; they are freshness-
/// stamped by the publication nonce, not change-gated by a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
  pub hostname: String,
  /// Dotted-quad IPv4 address. "0.0.0.0" when the probed interface has
  /// no address.
  pub ip_address: String,
  pub cpu_count: u32,
  /// Available memory in mebibytes.
  pub free_memory: u64,
}

impl HostFacts {
  /// Render as bucket fields for a `compute-facts` publication.
  pub fn to_fields(&self) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(fields::HOSTNAME.to_string(), self.hostname.clone());
    map.insert(fields::IP_ADDRESS.to_string(), self.ip_address.clone());
    map.insert(fields::CPU_COUNT.to_string(), self.cpu_count.to_string());
    map.insert(fields::FREE_MEMORY.to_string(), self.free_memory.to_string());
    map
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fields_carry_exactly_the_published_facts() {
    let facts = HostFacts {
      hostname: "node1".to_string(),
      ip_address: "10.0.0.7".to_string(),
      cpu_count: 8,
      free_memory: 2048,
    };

    let map = facts.to_fields();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get(fields::HOSTNAME).unwrap(), "node1");
    assert_eq!(map.get(fields::IP_ADDRESS).unwrap(), "10.0.0.7");
    assert_eq!(map.get(fields::CPU_COUNT).unwrap(), "8");
    assert_eq!(map.get(fields::FREE_MEMORY).unwrap(), "2048");
  }
}
