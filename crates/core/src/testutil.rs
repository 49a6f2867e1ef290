//! Test doubles for the synchronizer's collaborators.

use muster_relation::NonceGenerator;

use crate::report::StatusSink;
use crate::service::{InstallError, ServiceController, ServiceError};

/// Recording fake service controller.
///
/// Counts every call at the trait boundary and keeps an ordered event
/// log, so tests can assert how many stop/start cycles an operation
/// actually triggered and in what order.
#[derive(Debug)]
pub struct FakeService {
  name: String,
  pub installed: bool,
  pub running: bool,
  pub installs: usize,
  pub starts: usize,
  pub stops: usize,
  /// Fail the next `start` call, once.
  pub fail_next_start: bool,
  /// Ordered log of trait calls: "install", "start", "stop".
  pub events: Vec<&'static str>,
}

impl FakeService {
  /// An installed, running service.
  pub fn installed(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      installed: true,
      running: true,
      installs: 0,
      starts: 0,
      stops: 0,
      fail_next_start: false,
      events: Vec::new(),
    }
  }

  /// A service whose package is not present.
  pub fn not_installed(name: impl Into<String>) -> Self {
    Self {
      installed: false,
      running: false,
      ..Self::installed(name)
    }
  }
}

impl ServiceController for FakeService {
  fn name(&self) -> &str {
    &self.name
  }

  fn install(&mut self) -> Result<(), InstallError> {
    self.installs += 1;
    self.events.push("install");
    self.installed = true;
    Ok(())
  }

  fn start(&mut self) -> Result<(), ServiceError> {
    self.starts += 1;
    self.events.push("start");
    if self.fail_next_start {
      self.fail_next_start = false;
      return Err(ServiceError::Command {
        unit: self.name.clone(),
        message: "start failed".to_string(),
      });
    }
    self.running = true;
    Ok(())
  }

  fn stop(&mut self) -> Result<(), ServiceError> {
    self.stops += 1;
    self.events.push("stop");
    self.running = false;
    Ok(())
  }

  fn installed(&self) -> bool {
    self.installed
  }

  fn running(&self) -> bool {
    self.running
  }
}

/// Nonce generator that hands out a fixed sequence.
///
/// Panics when exhausted, so a test that over-publishes fails loudly.
#[derive(Debug)]
pub struct FixedNonces {
  nonces: Vec<String>,
}

impl FixedNonces {
  pub fn new<I, S>(nonces: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      nonces: nonces.into_iter().map(Into::into).collect(),
    }
  }

  pub fn remaining(&self) -> usize {
    self.nonces.len()
  }
}

impl NonceGenerator for FixedNonces {
  fn generate(&mut self) -> String {
    assert!(!self.nonces.is_empty(), "FixedNonces exhausted");
    self.nonces.remove(0)
  }
}

/// Sink that records every emitted status in order.
#[derive(Debug, Default)]
pub struct MemorySink {
  pub messages: Vec<String>,
}

impl StatusSink for MemorySink {
  fn emit(&mut self, message: &str) {
    self.messages.push(message.to_string());
  }
}
