//! muster-core: convergence logic for the muster agent.
//!
//! This crate provides the digest-gated configuration synchronizer:
//! - `Fingerprint`: content digests for change detection
//! - `Artifact`: a file-shaped configuration payload
//! - `ConfigSynchronizer`: the bucket-changed → evaluate → apply machine
//! - `ServiceController`: the contract for the supervised host service
//! - `LocalState` / `StateStore`: the consuming host's view, persisted
//! - status reporting as a pure event→message function plus a sink

pub mod artifact;
pub mod digest;
pub mod report;
pub mod service;
pub mod state;
pub mod sync;
pub mod testutil;

pub use artifact::{Artifact, ArtifactError};
pub use digest::{Fingerprint, digest_bytes, digest_file};
pub use report::{StatusSink, SyncEvent, render};
pub use service::{InstallError, ServiceController, ServiceError};
pub use state::{AppliedRecord, LocalState, StateError, StateStore};
pub use sync::{ConfigSynchronizer, SyncDecision, SyncError, SyncOutcome, publish_facts};
