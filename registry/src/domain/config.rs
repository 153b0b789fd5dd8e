// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Adapter Configuration - bootstrap-time settings for the registry adapter
//
// Defines the caller-supplied configuration merged with defaults by the
// registration bootstrap:
// - Registry instance naming
// - Cluster membership seed list
// - Worker distribution strategy
// - Substrate call timeout (passed through; the substrate owns enforcement)

use crate::domain::identity::NodeId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Policy the substrate uses to choose which cluster member hosts a new
/// worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionStrategy {
    /// Spread workers uniformly across all known members (default).
    UniformAcrossMembers,
    /// Place workers only on members currently marked active.
    ActiveNodesOnly,
}

impl Default for DistributionStrategy {
    fn default() -> Self {
        Self::UniformAcrossMembers
    }
}

/// Caller-supplied adapter configuration, consumed once per application at
/// bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Registry instance name. Defaults to one derived from the application
    /// identifier when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<String>,

    /// Seed list of known cluster members.
    #[serde(default)]
    pub members: Vec<NodeId>,

    /// Worker distribution strategy.
    #[serde(default)]
    pub distribution: DistributionStrategy,

    /// Timeout forwarded to substrate calls, in milliseconds. The substrate
    /// enforces it; the adapter performs no internal retry-with-backoff.
    #[serde(default = "default_substrate_timeout_ms")]
    pub substrate_timeout_ms: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            registry_name: None,
            members: Vec::new(),
            distribution: DistributionStrategy::default(),
            substrate_timeout_ms: default_substrate_timeout_ms(),
        }
    }
}

impl AdapterConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Apply environment variable overrides to configuration.
    /// Allows container deployments to override config without re-mounting
    /// the YAML file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AEGIS_REGISTRY_NAME") {
            if !val.is_empty() {
                tracing::info!("Environment override: AEGIS_REGISTRY_NAME={}", val);
                self.registry_name = Some(val);
            }
        }

        if let Ok(val) = std::env::var("AEGIS_REGISTRY_MEMBERS") {
            let members: Vec<NodeId> = val
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(NodeId::new)
                .collect();
            if !members.is_empty() {
                tracing::info!("Environment override: AEGIS_REGISTRY_MEMBERS ({} members)", members.len());
                self.members = members;
            }
        }

        if let Ok(val) = std::env::var("AEGIS_REGISTRY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => {
                    tracing::info!("Environment override: AEGIS_REGISTRY_TIMEOUT_MS={}", ms);
                    self.substrate_timeout_ms = ms;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for AEGIS_REGISTRY_TIMEOUT_MS: '{}'. Expected positive integer. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.registry_name {
            if name.is_empty() {
                anyhow::bail!("registry_name cannot be empty when set");
            }
        }

        if self.substrate_timeout_ms == 0 {
            anyhow::bail!("substrate_timeout_ms must be positive");
        }

        for member in &self.members {
            if member.as_str().is_empty() {
                anyhow::bail!("cluster member ids cannot be empty");
            }
        }

        Ok(())
    }
}

fn default_substrate_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdapterConfig::default();
        assert!(config.registry_name.is_none());
        assert!(config.members.is_empty());
        assert_eq!(config.distribution, DistributionStrategy::UniformAcrossMembers);
        assert_eq!(config.substrate_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
registry_name: billing-registry
members:
  - node-a
  - node-b
distribution: active-nodes-only
substrate_timeout_ms: 2500
"#;
        let config = AdapterConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.registry_name.as_deref(), Some("billing-registry"));
        assert_eq!(config.members, vec![NodeId::new("node-a"), NodeId::new("node-b")]);
        assert_eq!(config.distribution, DistributionStrategy::ActiveNodesOnly);
        assert_eq!(config.substrate_timeout_ms, 2500);
    }

    // All env manipulation stays inside this one test so parallel test
    // threads never observe each other's variables.
    #[test]
    fn test_env_overrides() {
        let mut config = AdapterConfig::default();

        std::env::set_var("AEGIS_REGISTRY_NAME", "billing-eu");
        std::env::set_var("AEGIS_REGISTRY_MEMBERS", "node-a, node-b,");
        std::env::set_var("AEGIS_REGISTRY_TIMEOUT_MS", "2500");
        config.apply_env_overrides();

        assert_eq!(config.registry_name.as_deref(), Some("billing-eu"));
        assert_eq!(
            config.members,
            vec![NodeId::new("node-a"), NodeId::new("node-b")],
            "member list is split on commas and trimmed"
        );
        assert_eq!(config.substrate_timeout_ms, 2500);

        // Malformed timeout values are ignored, not propagated.
        std::env::set_var("AEGIS_REGISTRY_TIMEOUT_MS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.substrate_timeout_ms, 2500);

        // So is a zero timeout, which validate() would reject.
        std::env::set_var("AEGIS_REGISTRY_TIMEOUT_MS", "0");
        config.apply_env_overrides();
        assert_eq!(config.substrate_timeout_ms, 2500);

        // An empty name does not clobber an explicit one.
        std::env::set_var("AEGIS_REGISTRY_NAME", "");
        config.apply_env_overrides();
        assert_eq!(config.registry_name.as_deref(), Some("billing-eu"));

        std::env::remove_var("AEGIS_REGISTRY_NAME");
        std::env::remove_var("AEGIS_REGISTRY_MEMBERS");
        std::env::remove_var("AEGIS_REGISTRY_TIMEOUT_MS");
    }

    #[test]
    fn test_validation() {
        let mut config = AdapterConfig::default();
        assert!(config.validate().is_ok());

        config.registry_name = Some(String::new());
        assert!(config.validate().is_err());
        config.registry_name = Some("billing".to_string());

        config.substrate_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.substrate_timeout_ms = 1000;

        config.members.push(NodeId::new(""));
        assert!(config.validate().is_err());
    }
}
