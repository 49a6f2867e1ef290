//! muster-relation: the peer-scoped data exchange for muster.
//!
//! This crate provides the types a unit uses to exchange configuration
//! artifacts and host facts with its peers:
//! - `RelationKind`: the closed set of relations this agent speaks
//! - `Bucket`: one peer's published fields, plus the freshness nonce
//! - `RelationStore`: the on-disk snapshot of the pub/sub substrate
//! - `HostFacts`: the facts a compute node publishes about itself
//! - `NonceGenerator`: freshness tokens for publications

mod bucket;
mod facts;
mod kind;
mod nonce;
mod store;

pub use bucket::{Bucket, Publication, fields};
pub use facts::HostFacts;
pub use kind::{RelationKind, UnknownRelation};
pub use nonce::{NonceGenerator, UuidNonce};
pub use store::{RelationStore, StoreError};
