//! Implementation of the `musterd status` command.
//!
//! Prints the local view: installed/running state per service, the
//! digest of each artifact on disk, and the last applied publication.
//! A service that is stopped while an applied configuration sits on
//! disk is called out explicitly; the agent never restarts it behind
//! the operator's back.

use anyhow::{Context, Result};

use muster_core::{LocalState, StateStore};
use muster_platform::{FactProbe, SystemdService};
use muster_relation::RelationKind;

use crate::config::AgentConfig;

pub fn cmd_status(config: &AgentConfig) -> Result<()> {
  println!("musterd v{}", env!("CARGO_PKG_VERSION"));
  println!();

  let state_store = StateStore::default_store();

  for (kind, service_config) in [
    (RelationKind::AuthKey, &config.auth),
    (RelationKind::ControllerConfig, &config.compute),
  ] {
    let controller = SystemdService::new(&service_config.service, &service_config.package);

    let state = LocalState::observe(&controller, &service_config.artifact_path)
      .with_context(|| format!("failed to observe state for {}", service_config.service))?;

    println!("{} ({})", service_config.service, kind);
    println!("  Installed: {}", if state.installed { "yes" } else { "no" });
    println!("  Running:   {}", if state.running { "yes" } else { "no" });
    match &state.current_digest {
      Some(digest) => println!("  Artifact:  {} ({})", service_config.artifact_path.display(), digest),
      None => println!("  Artifact:  {} (absent)", service_config.artifact_path.display()),
    }

    let record = state_store
      .load(kind)
      .with_context(|| format!("failed to load applied record for '{}'", kind))?;
    match &record {
      Some(record) => println!("  Applied:   nonce {} at {}", record.nonce, record.applied_at),
      None => println!("  Applied:   never"),
    }

    if state.installed && !state.running && record.is_some() {
      println!("  Note:      service is stopped with applied configuration on disk; run 'musterd start'");
    }
    println!();
  }

  let facts = FactProbe::new(&config.facts.interface).probe();
  println!("Host facts ({})", config.facts.interface);
  println!("  Hostname:    {}", facts.hostname);
  println!("  IP address:  {}", facts.ip_address);
  println!("  CPUs:        {}", facts.cpu_count);
  println!("  Free memory: {} MiB", facts.free_memory);

  Ok(())
}
