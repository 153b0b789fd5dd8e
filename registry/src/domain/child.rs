// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Child Specification
//!
//! Describes how the substrate supervisor constructs one worker: worker
//! module, opaque start arguments, restart policy, and — once the starter
//! has resolved it — the routing address the worker self-registers under.

use crate::domain::address::RoutingAddress;
use crate::domain::identity::{WorkerModule, WorkerName};
use serde::{Deserialize, Serialize};

/// Restart policy tag forwarded to the substrate supervisor.
///
/// Uniquely-named workers default to `Transient`: a clean exit tears down the
/// name binding for good, a crash is the substrate's to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    Permanent,
    Transient,
    Temporary,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::Transient
    }
}

/// Description of one child for the substrate supervisor to construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSpec {
    /// Stable spec identifier. Derived from `(module, name)` so several specs
    /// for the same module stay distinguishable inside one supervisor.
    pub id: String,
    /// Worker type to construct.
    pub module: WorkerModule,
    /// Opaque start arguments handed to the worker verbatim.
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default)]
    pub restart: RestartPolicy,
    /// Self-registration target injected by the starter before the single
    /// creation attempt. `None` only for specs that never went through the
    /// starter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RoutingAddress>,
}

impl ChildSpec {
    /// Spec for `module` keyed by the module identifier alone.
    pub fn new(module: WorkerModule, args: serde_json::Value) -> Self {
        Self {
            id: module.as_str().to_string(),
            module,
            args,
            restart: RestartPolicy::default(),
            registration: None,
        }
    }

    /// Spec with a stable id derived from `(module, name)`.
    pub fn for_worker(module: WorkerModule, name: &WorkerName, args: serde_json::Value) -> Self {
        let id = format!("{}:{}", module, name);
        Self {
            id,
            module,
            args,
            restart: RestartPolicy::default(),
            registration: None,
        }
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    /// Inject the routing address the worker must self-register under.
    pub fn registered_at(mut self, address: RoutingAddress) -> Self {
        self.registration = Some(address);
        self
    }
}
