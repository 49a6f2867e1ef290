//! Implementation of the `musterd start` command.
//!
//! Brings up the authentication daemon before the compute daemon, since
//! the compute daemon authenticates through it. Both starts are no-ops
//! when the service is already running.

use anyhow::{Context, Result};

use muster_core::ServiceController;
use muster_platform::SystemdService;

use crate::config::AgentConfig;

pub fn cmd_start(config: &AgentConfig) -> Result<()> {
  for service_config in [&config.auth, &config.compute] {
    println!("Starting {}", service_config.service);

    let mut controller = SystemdService::new(&service_config.service, &service_config.package);
    controller
      .start()
      .with_context(|| format!("failed to start {}", service_config.service))?;
  }

  println!("Compute node is active");
  Ok(())
}
