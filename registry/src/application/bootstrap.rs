// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Registration Bootstrap
//!
//! Describes, once per application at boot, what substrate instances must
//! exist: the registry instance the adapter will route through, and one
//! distributed supervisor per worker module. Both operations are pure
//! descriptions; the supervision bootstrap that consumes the specs owns
//! actually starting the instances — and the double-start policy with it.

use crate::domain::config::{AdapterConfig, DistributionStrategy};
use crate::domain::identity::{ApplicationId, NodeId, RegistryId, WorkerModule};
use crate::domain::metadata::RegistryMetadata;
use crate::domain::substrate::{ClusterMembership, NameRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Restart policy tag for a described supervisor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartStrategy {
    OneForOne,
    OneForAll,
    RestForOne,
}

impl Default for RestartStrategy {
    fn default() -> Self {
        Self::OneForOne
    }
}

/// Which substrate component a startup spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Registry,
    Supervisor,
}

/// Description of one substrate instance the supervision bootstrap must
/// start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupSpec {
    pub component: ComponentKind,
    pub name: String,
    /// Substrate-specific startup options, passed through verbatim.
    pub options: HashMap<String, serde_json::Value>,
}

/// Everything `describe_registry` produces: the registry identity, the
/// startup specs for the supervision bootstrap, and the metadata every
/// subsequent adapter call carries.
#[derive(Clone)]
pub struct RegistryDescription {
    pub registry_id: RegistryId,
    pub startup_specs: Vec<StartupSpec>,
    pub metadata: RegistryMetadata,
}

/// Configuration for one distributed supervisor instance dedicated to a
/// worker module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSpec {
    pub name: String,
    pub worker_module: WorkerModule,
    #[serde(default)]
    pub init_args: serde_json::Value,
    #[serde(default)]
    pub strategy: RestartStrategy,
    #[serde(default)]
    pub distribution: DistributionStrategy,
    pub members: Vec<NodeId>,
    /// Override keys this layer does not interpret, kept for the substrate.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Describe the registry instance for `application` and build the adapter
/// metadata callers use afterwards.
///
/// Pure and idempotent: calling it twice with the same inputs yields the
/// same description. The supervision bootstrap consuming the startup specs
/// decides whether a second start of the same instances is an error.
pub fn describe_registry(
    application: &ApplicationId,
    config: AdapterConfig,
    registry: Arc<dyn NameRegistry>,
    membership: Arc<dyn ClusterMembership>,
) -> anyhow::Result<RegistryDescription> {
    config.validate()?;

    let registry_id = RegistryId::new(
        config
            .registry_name
            .clone()
            .unwrap_or_else(|| format!("aegis.registry.{}", application)),
    );

    let members = if config.members.is_empty() {
        membership.members()
    } else {
        config.members.clone()
    };

    let mut options = HashMap::new();
    options.insert("keys".to_string(), serde_json::json!("unique"));
    options.insert("members".to_string(), serde_json::to_value(&members)?);
    options.insert(
        "timeout_ms".to_string(),
        serde_json::json!(config.substrate_timeout_ms),
    );

    let startup_specs = vec![StartupSpec {
        component: ComponentKind::Registry,
        name: registry_id.as_str().to_string(),
        options,
    }];

    info!(
        application = %application,
        registry = %registry_id,
        members = members.len(),
        "Described registry instance"
    );

    let metadata = RegistryMetadata::new(
        registry_id.clone(),
        config.distribution,
        registry,
        membership,
    );

    Ok(RegistryDescription {
        registry_id,
        startup_specs,
        metadata,
    })
}

/// Describe a distributed supervisor instance dedicated to `worker_module`.
///
/// Defaults: one-for-one restart strategy, the metadata's distribution
/// strategy, supervisor name derived from the worker module, and the current
/// cluster membership snapshot. `overrides` is a flat key/value map merged
/// key-by-key over those defaults; the override wins on every conflicting
/// key. Recognized keys (`name`, `strategy`, `distribution`, `members`)
/// must deserialize to their typed field; unrecognized keys are kept in
/// `extra` for the substrate.
pub fn describe_supervisor(
    metadata: &RegistryMetadata,
    worker_module: &WorkerModule,
    init_args: serde_json::Value,
    overrides: HashMap<String, serde_json::Value>,
) -> anyhow::Result<SupervisorSpec> {
    let mut spec = SupervisorSpec {
        name: worker_module.as_str().to_string(),
        worker_module: worker_module.clone(),
        init_args,
        strategy: RestartStrategy::default(),
        distribution: metadata.distribution(),
        members: metadata.members(),
        extra: HashMap::new(),
    };

    for (key, value) in overrides {
        match key.as_str() {
            "name" => {
                spec.name = serde_json::from_value(value)
                    .map_err(|e| anyhow::anyhow!("override 'name' must be a string: {}", e))?;
            }
            "strategy" => {
                spec.strategy = serde_json::from_value(value)
                    .map_err(|e| anyhow::anyhow!("override 'strategy' is not a restart strategy: {}", e))?;
            }
            "distribution" => {
                spec.distribution = serde_json::from_value(value).map_err(|e| {
                    anyhow::anyhow!("override 'distribution' is not a distribution strategy: {}", e)
                })?;
            }
            "members" => {
                spec.members = serde_json::from_value(value)
                    .map_err(|e| anyhow::anyhow!("override 'members' must be a node list: {}", e))?;
            }
            _ => {
                spec.extra.insert(key, value);
            }
        }
    }

    if spec.name.is_empty() {
        anyhow::bail!("supervisor name cannot be empty");
    }

    Ok(spec)
}
