//! Implementation of the `musterd sync` command.
//!
//! Delivers one bucket-changed event for a consumed relation: reads the
//! controller's bucket from the relation store and runs the synchronizer
//! against it. The event loop hosting this agent serializes invocations,
//! so the whole cycle runs to completion here.

use anyhow::{Context, Result, bail};

use muster_core::{ConfigSynchronizer, StateStore};
use muster_platform::SystemdService;
use muster_relation::{RelationKind, RelationStore};

use crate::config::AgentConfig;
use crate::output::PrintSink;

pub fn cmd_sync(config: &AgentConfig, relation: &str) -> Result<()> {
  let kind: RelationKind = relation.parse()?;
  let Some(service_config) = config.consumer(kind) else {
    bail!("relation '{}' is published by this unit; use publish-facts", kind);
  };

  let store = RelationStore::default_store();
  let state = StateStore::default_store();
  let mut controller = SystemdService::new(&service_config.service, &service_config.package);
  let mut sink = PrintSink;

  let bucket = store
    .read(kind, &config.relations.controller_app)
    .with_context(|| format!("failed to read '{}' bucket", kind))?;

  let mut synchronizer = ConfigSynchronizer::new(kind, &mut controller, &state, &mut sink);
  let outcome = synchronizer
    .on_bucket_changed(&bucket)
    .with_context(|| format!("sync failed for relation '{}'", kind))?;

  println!("{}: {}", kind, outcome);
  Ok(())
}
