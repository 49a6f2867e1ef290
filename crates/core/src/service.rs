//! The contract between the synchronizer and the supervised host service.
//!
//! The synchronizer never talks to the service manager directly; it is
//! handed a `ServiceController` at construction time. Implementations
//! live in muster-platform; tests use the recording fake in
//! [`crate::testutil`].

use std::io;

/// Package installation failure. Surfaced, never auto-retried.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
  #[error("package '{package}' not found")]
  NotFound { package: String },

  #[error("failed to install '{package}': {message}")]
  Command { package: String, message: String },
}

/// Service manager failure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error("service command failed for '{unit}': {message}")]
  Command { unit: String, message: String },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Install, start, stop and observe a named host service.
///
/// All operations are idempotent relative to current state: starting a
/// running service and stopping a stopped one are no-ops.
pub trait ServiceController {
  /// Service name, for status messages and logs.
  fn name(&self) -> &str;

  /// Install the backing package. May fail with a lookup or transport
  /// error; callers surface it and do not retry.
  fn install(&mut self) -> Result<(), InstallError>;

  fn start(&mut self) -> Result<(), ServiceError>;

  fn stop(&mut self) -> Result<(), ServiceError>;

  fn restart(&mut self) -> Result<(), ServiceError> {
    self.stop()?;
    self.start()
  }

  /// Whether the backing package is present on the host.
  fn installed(&self) -> bool;

  /// Whether the service is currently running.
  fn running(&self) -> bool;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::FakeService;

  #[test]
  fn restart_is_stop_then_start() {
    let mut service = FakeService::installed("slurmd");
    service.restart().unwrap();

    assert_eq!(service.events, vec!["stop", "start"]);
    assert!(service.running);
  }
}
