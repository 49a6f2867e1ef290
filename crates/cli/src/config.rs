//! Agent configuration.
//!
//! A small TOML file declaring the supervised services, artifact
//! destinations, and relation peers. Every field has a default matching
//! a stock Debian cluster node, so a missing config file means "use the
//! defaults".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use muster_relation::RelationKind;

/// Errors loading the agent configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config: {0}")]
  Read(#[source] io::Error),

  #[error("failed to parse config: {0}")]
  Parse(#[source] toml::de::Error),
}

/// One supervised service and the artifact it depends on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
  /// systemd unit name.
  pub service: String,
  /// Debian package providing the unit.
  pub package: String,
  /// Where the relation-delivered artifact lands on this host.
  pub artifact_path: PathBuf,
}

/// Peer identities on the relations this unit participates in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationsConfig {
  /// Application that publishes the auth key and controller config.
  pub controller_app: String,
  /// This unit's identity when publishing its own facts.
  pub unit_name: String,
}

impl Default for RelationsConfig {
  fn default() -> Self {
    Self {
      controller_app: "slurm-server".to_string(),
      unit_name: "muster/0".to_string(),
    }
  }
}

/// Host-fact probing options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactsConfig {
  /// Interface whose IPv4 address is published.
  pub interface: String,
}

impl Default for FactsConfig {
  fn default() -> Self {
    Self {
      interface: "eth0".to_string(),
    }
  }
}

/// Complete agent configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
  pub auth: ServiceConfig,
  pub compute: ServiceConfig,
  pub relations: RelationsConfig,
  pub facts: FactsConfig,
}

// Defaults match the services this agent was built around: munge for
// authentication, slurmd for compute.
impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      auth: ServiceConfig {
        service: "munge".to_string(),
        package: "munge".to_string(),
        artifact_path: PathBuf::from("/etc/munge/munge.key"),
      },
      compute: ServiceConfig {
        service: "slurmd".to_string(),
        package: "slurmd".to_string(),
        artifact_path: PathBuf::from("/etc/slurm/slurm.conf"),
      },
      relations: RelationsConfig::default(),
      facts: FactsConfig::default(),
    }
  }
}

impl AgentConfig {
  /// Load from a TOML file; a missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(e) => return Err(ConfigError::Read(e)),
    };

    toml::from_str(&content).map_err(ConfigError::Parse)
  }

  /// The service config backing a consumed relation.
  pub fn consumer(&self, kind: RelationKind) -> Option<&ServiceConfig> {
    match kind {
      RelationKind::AuthKey => Some(&self.auth),
      RelationKind::ControllerConfig => Some(&self.compute),
      RelationKind::ComputeFacts => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = AgentConfig::load(&temp.path().join("nope.toml")).unwrap();

    assert_eq!(config.auth.service, "munge");
    assert_eq!(config.compute.service, "slurmd");
    assert_eq!(config.relations.controller_app, "slurm-server");
    assert_eq!(config.facts.interface, "eth0");
  }

  #[test]
  fn partial_file_overrides_only_named_sections() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
      &path,
      r#"
      [facts]
      interface = "ens3"
      "#,
    )
    .unwrap();

    let config = AgentConfig::load(&path).unwrap();
    assert_eq!(config.facts.interface, "ens3");
    assert_eq!(config.auth.service, "munge");
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[facts]\ninterfaec = \"eth0\"\n").unwrap();

    assert!(matches!(AgentConfig::load(&path), Err(ConfigError::Parse(_))));
  }

  #[test]
  fn consumer_maps_relations_to_services() {
    let config = AgentConfig::default();
    assert_eq!(config.consumer(RelationKind::AuthKey).unwrap().service, "munge");
    assert_eq!(
      config.consumer(RelationKind::ControllerConfig).unwrap().service,
      "slurmd"
    );
    assert!(config.consumer(RelationKind::ComputeFacts).is_none());
  }
}
