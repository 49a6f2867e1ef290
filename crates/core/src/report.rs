//! Status reporting.
//!
//! Every decision and transition the synchronizer makes is surfaced as a
//! human-readable status. [`render`] is a pure event→message function and
//! [`StatusSink`] is the single side-effecting boundary, so the sequence
//! of emitted statuses can be asserted independently of how they are
//! displayed.

use muster_relation::RelationKind;

/// An observable transition of the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
  /// A bucket-changed notification arrived for this relation.
  ChangeDetected(RelationKind),
  /// The peer has not completed a publication yet.
  NotReady(RelationKind),
  /// Local content already matches the publication.
  UpToDate(RelationKind),
  /// The artifact was applied and the service restarted.
  Updated(RelationKind),
  /// Apply was attempted before the dependent service was installed.
  ServiceNotInstalled(RelationKind, String),
  /// The artifact was written but the service failed to come back up.
  StartFailed(RelationKind, String),
  /// The apply cycle failed for any other reason.
  ApplyFailed(RelationKind, String),
  /// Self-publication of host facts is starting.
  PublishingFacts,
  /// Host facts were published under a fresh nonce.
  FactsPublished,
}

/// Render an event as its status message.
pub fn render(event: &SyncEvent) -> String {
  use RelationKind::{AuthKey, ComputeFacts, ControllerConfig};
  use SyncEvent::*;

  match event {
    ChangeDetected(AuthKey) => "New authentication key detected".to_string(),
    ChangeDetected(ControllerConfig) => "New controller configuration detected".to_string(),
    ChangeDetected(ComputeFacts) => "New host facts detected".to_string(),

    NotReady(AuthKey) => "Authentication key is not ready".to_string(),
    NotReady(ControllerConfig) => "Controller configuration is not ready".to_string(),
    NotReady(ComputeFacts) => "Host facts are not ready".to_string(),

    UpToDate(AuthKey) => "Authentication key does not need to be updated".to_string(),
    UpToDate(ControllerConfig) => "Controller configuration does not need to be updated".to_string(),
    UpToDate(ComputeFacts) => "Host facts do not need to be updated".to_string(),

    Updated(AuthKey) => "Authentication key updated".to_string(),
    Updated(ControllerConfig) => "Controller configuration updated".to_string(),
    Updated(ComputeFacts) => "Host facts updated".to_string(),

    ServiceNotInstalled(_, service) => format!("{} is not installed", service),
    StartFailed(kind, service) => match kind {
      AuthKey => format!("Authentication key updated but {} failed to start", service),
      ControllerConfig => format!("Controller configuration updated but {} failed to start", service),
      ComputeFacts => format!("Host facts updated but {} failed to start", service),
    },
    ApplyFailed(kind, message) => match kind {
      AuthKey => format!("Authentication key update failed: {}", message),
      ControllerConfig => format!("Controller configuration update failed: {}", message),
      ComputeFacts => format!("Host facts update failed: {}", message),
    },

    PublishingFacts => "Publishing host facts".to_string(),
    FactsPublished => "Host facts published".to_string(),
  }
}

/// Where rendered statuses go.
///
/// The synchronizer renders events and hands the message to exactly one
/// sink; nothing else writes to the status channel.
pub trait StatusSink {
  fn emit(&mut self, message: &str);
}
