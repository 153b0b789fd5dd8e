// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Routing Address
//!
//! The via-address the substrate uses to route lookups and messages to a
//! uniquely-named worker: "this logical name inside this registry instance".
//! Derivation is a pure function of `(RegistryId, WorkerName)`; two calls
//! with the same inputs always yield the same address.

use crate::domain::identity::{RegistryId, WorkerName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Textual scheme prefix for rendered addresses.
const VIA_SCHEME: &str = "via:";

/// Deterministic routing token for one logical name inside one registry
/// instance.
///
/// Valid before the named worker exists: the same address registers a worker
/// under construction and routes lookups to it once alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingAddress {
    registry: RegistryId,
    name: WorkerName,
}

impl RoutingAddress {
    pub fn new(registry: RegistryId, name: WorkerName) -> Self {
        Self { registry, name }
    }

    pub fn registry(&self) -> &RegistryId {
        &self.registry
    }

    pub fn name(&self) -> &WorkerName {
        &self.name
    }
}

impl fmt::Display for RoutingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{VIA_SCHEME}{}/{}", self.registry, self.name)
    }
}

#[derive(Debug, Error)]
pub enum AddressParseError {
    #[error("routing address '{0}' is missing the 'via:' scheme")]
    MissingScheme(String),
    #[error("routing address '{0}' is missing the registry/name separator")]
    MissingSeparator(String),
    #[error("routing address '{0}' has an empty registry or name component")]
    EmptyComponent(String),
}

impl FromStr for RoutingAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(VIA_SCHEME)
            .ok_or_else(|| AddressParseError::MissingScheme(s.to_string()))?;
        // Names may contain '/', registry ids may not; split on the first.
        let (registry, name) = rest
            .split_once('/')
            .ok_or_else(|| AddressParseError::MissingSeparator(s.to_string()))?;
        if registry.is_empty() || name.is_empty() {
            return Err(AddressParseError::EmptyComponent(s.to_string()));
        }
        Ok(Self {
            registry: RegistryId::new(registry),
            name: WorkerName::new(name),
        })
    }
}
