//! muster-platform: host integration for the muster agent.
//!
//! This crate provides the concrete collaborators the core is handed at
//! construction time:
//! - `SystemdService`: a `ServiceController` backed by systemctl
//! - apt package installation
//! - `FactProbe`: live host facts (hostname, address, cpu, memory)

mod pkg;
mod probe;
mod service;

pub use pkg::apt_install;
pub use probe::FactProbe;
pub use service::SystemdService;
