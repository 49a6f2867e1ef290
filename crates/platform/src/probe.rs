//! Live host facts for self-publication.

use sysinfo::{Networks, System};
use tracing::debug;

use muster_relation::HostFacts;

const MIB: u64 = 1024 * 1024;

/// Probes the facts a compute node publishes about itself.
#[derive(Debug, Clone)]
pub struct FactProbe {
  interface: String,
}

impl FactProbe {
  /// Probe addresses on the given network interface.
  pub fn new(interface: impl Into<String>) -> Self {
    Self {
      interface: interface.into(),
    }
  }

  /// Gather current facts. Values are live at probe time; the
  /// publication nonce is what stamps them as fresh.
  pub fn probe(&self) -> HostFacts {
    let sys = System::new_all();

    HostFacts {
      hostname: hostname(),
      ip_address: self.ipv4_address().unwrap_or_else(|| "0.0.0.0".to_string()),
      cpu_count: sys.cpus().len() as u32,
      free_memory: sys.available_memory() / MIB,
    }
  }

  /// First non-loopback IPv4 address on the configured interface.
  fn ipv4_address(&self) -> Option<String> {
    let networks = Networks::new_with_refreshed_list();

    for (name, data) in &networks {
      if name != &self.interface {
        continue;
      }
      for network in data.ip_networks() {
        if network.addr.is_ipv4() && !network.addr.is_loopback() {
          return Some(network.addr.to_string());
        }
      }
    }

    debug!(interface = %self.interface, "no IPv4 address on interface");
    None
  }
}

fn hostname() -> String {
  System::host_name()
    .or_else(|| whoami::fallible::hostname().ok())
    .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn probe_reports_plausible_facts() {
    let facts = FactProbe::new("eth0").probe();

    assert!(!facts.hostname.is_empty());
    assert!(facts.cpu_count >= 1);
    // Dotted quad, whatever the interface situation is.
    assert_eq!(facts.ip_address.split('.').count(), 4);
  }

  #[test]
  fn unknown_interface_falls_back_to_zero_address() {
    let facts = FactProbe::new("muster-test-no-such-iface").probe();
    assert_eq!(facts.ip_address, "0.0.0.0");
  }
}
