//! Implementation of the `musterd install` command.
//!
//! Installs the authentication daemon first, then the compute daemon,
//! and enables both units. Installation failures surface immediately;
//! nothing is retried.

use anyhow::{Context, Result};
use tracing::info;

use muster_core::ServiceController;
use muster_platform::SystemdService;

use crate::config::AgentConfig;

pub fn cmd_install(config: &AgentConfig) -> Result<()> {
  for service_config in [&config.auth, &config.compute] {
    println!("Installing {}", service_config.service);
    info!(package = %service_config.package, "installing");

    let mut controller = SystemdService::new(&service_config.service, &service_config.package);
    controller
      .install()
      .with_context(|| format!("failed to install {}", service_config.package))?;
    controller
      .enable()
      .with_context(|| format!("failed to enable {}", service_config.service))?;
  }

  println!("Install complete");
  Ok(())
}
