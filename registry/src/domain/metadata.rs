// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Metadata
//!
//! The immutable record every adapter call carries: which registry instance
//! to talk to, the distribution strategy in force, and the substrate
//! collaborators themselves. Created once per application at bootstrap and
//! never mutated afterwards.
//!
//! The substrate is an explicitly injected reference held here, not ambient
//! process-wide state; every operation receives the metadata by reference.

use crate::domain::config::DistributionStrategy;
use crate::domain::identity::{NodeId, RegistryId};
use crate::domain::substrate::{ClusterMembership, NameRegistry};
use std::fmt;
use std::sync::Arc;

/// Immutable per-application adapter metadata.
///
/// Cheap to clone; clones share the substrate collaborators.
#[derive(Clone)]
pub struct RegistryMetadata {
    registry_id: RegistryId,
    distribution: DistributionStrategy,
    registry: Arc<dyn NameRegistry>,
    membership: Arc<dyn ClusterMembership>,
}

impl RegistryMetadata {
    pub fn new(
        registry_id: RegistryId,
        distribution: DistributionStrategy,
        registry: Arc<dyn NameRegistry>,
        membership: Arc<dyn ClusterMembership>,
    ) -> Self {
        Self {
            registry_id,
            distribution,
            registry,
            membership,
        }
    }

    /// The registry instance all lookups and registrations go through.
    pub fn registry_id(&self) -> &RegistryId {
        &self.registry_id
    }

    pub fn distribution(&self) -> DistributionStrategy {
        self.distribution
    }

    /// The substrate's lookup port.
    pub fn registry(&self) -> &Arc<dyn NameRegistry> {
        &self.registry
    }

    /// Current cluster membership snapshot.
    pub fn members(&self) -> Vec<NodeId> {
        self.membership.members()
    }
}

impl fmt::Debug for RegistryMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryMetadata")
            .field("registry_id", &self.registry_id)
            .field("distribution", &self.distribution)
            .finish_non_exhaustive()
    }
}
