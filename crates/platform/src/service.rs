//! systemd-backed service control.

use std::process::Command;

use tracing::debug;

use muster_core::service::{InstallError, ServiceController, ServiceError};

use crate::pkg;

/// A host service managed through systemctl, installed from a Debian
/// package.
#[derive(Debug, Clone)]
pub struct SystemdService {
  unit: String,
  package: String,
}

impl SystemdService {
  pub fn new(unit: impl Into<String>, package: impl Into<String>) -> Self {
    Self {
      unit: unit.into(),
      package: package.into(),
    }
  }

  /// Enable the unit so it starts on boot.
  pub fn enable(&self) -> Result<(), ServiceError> {
    debug!(unit = %self.unit, "enabling service");
    self.systemctl("enable")
  }

  fn systemctl(&self, verb: &str) -> Result<(), ServiceError> {
    let output = Command::new("systemctl").arg(verb).arg(&self.unit).output()?;

    if output.status.success() {
      Ok(())
    } else {
      Err(ServiceError::Command {
        unit: self.unit.clone(),
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      })
    }
  }
}

impl ServiceController for SystemdService {
  fn name(&self) -> &str {
    &self.unit
  }

  fn install(&mut self) -> Result<(), InstallError> {
    pkg::apt_install(&self.package)
  }

  fn start(&mut self) -> Result<(), ServiceError> {
    if self.running() {
      debug!(unit = %self.unit, "service already running");
      return Ok(());
    }
    debug!(unit = %self.unit, "starting service");
    self.systemctl("start")
  }

  fn stop(&mut self) -> Result<(), ServiceError> {
    if !self.running() {
      debug!(unit = %self.unit, "service already stopped");
      return Ok(());
    }
    debug!(unit = %self.unit, "stopping service");
    self.systemctl("stop")
  }

  /// Whether the backing package is present, per dpkg. A host without
  /// dpkg simply reports not installed.
  fn installed(&self) -> bool {
    let output = Command::new("dpkg-query")
      .args(["-W", "-f", "${db:Status-Status}"])
      .arg(&self.package)
      .output();

    match output {
      Ok(output) => {
        output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "installed"
      }
      Err(e) => {
        debug!(package = %self.package, error = %e, "dpkg-query unavailable");
        false
      }
    }
  }

  fn running(&self) -> bool {
    let status = Command::new("systemctl")
      .args(["is-active", "--quiet"])
      .arg(&self.unit)
      .status();

    match status {
      Ok(status) => status.success(),
      Err(e) => {
        debug!(unit = %self.unit, error = %e, "systemctl unavailable");
        false
      }
    }
  }
}
