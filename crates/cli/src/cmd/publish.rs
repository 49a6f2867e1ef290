//! Implementation of the `musterd publish-facts` command.
//!
//! Probes live host facts and publishes them under a fresh nonce. This
//! path is freshness-stamped, not change-gated: every invocation
//! publishes.

use anyhow::{Context, Result};

use muster_core::publish_facts;
use muster_platform::FactProbe;
use muster_relation::{RelationStore, UuidNonce};

use crate::config::AgentConfig;
use crate::output::PrintSink;

pub fn cmd_publish_facts(config: &AgentConfig) -> Result<()> {
  let facts = FactProbe::new(&config.facts.interface).probe();
  let store = RelationStore::default_store();
  let mut nonces = UuidNonce;
  let mut sink = PrintSink;

  let nonce = publish_facts(
    &store,
    &config.relations.unit_name,
    &facts,
    &mut nonces,
    &mut sink,
  )
  .context("failed to publish host facts")?;

  println!();
  println!("Published as {}:", config.relations.unit_name);
  println!("  Hostname:    {}", facts.hostname);
  println!("  IP address:  {}", facts.ip_address);
  println!("  CPUs:        {}", facts.cpu_count);
  println!("  Free memory: {} MiB", facts.free_memory);
  println!("  Nonce:       {}", nonce);

  Ok(())
}
