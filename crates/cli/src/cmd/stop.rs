//! Implementation of the `musterd stop` command.
//!
//! Stops the compute daemon before the authentication daemon, the
//! reverse of start order.

use anyhow::{Context, Result};

use muster_core::ServiceController;
use muster_platform::SystemdService;

use crate::config::AgentConfig;

pub fn cmd_stop(config: &AgentConfig) -> Result<()> {
  for service_config in [&config.compute, &config.auth] {
    println!("Stopping {}", service_config.service);

    let mut controller = SystemdService::new(&service_config.service, &service_config.package);
    controller
      .stop()
      .with_context(|| format!("failed to stop {}", service_config.service))?;
  }

  println!("Compute node is not active");
  Ok(())
}
