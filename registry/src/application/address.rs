// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Address Resolution
//!
//! Builds the via-address for a logical name inside the registry instance
//! named by the metadata. Pure and total: no substrate round-trip, no
//! requirement that the worker exists yet.

use crate::domain::address::RoutingAddress;
use crate::domain::identity::WorkerName;
use crate::domain::metadata::RegistryMetadata;

/// Resolve the routing address for `name` in the metadata's registry
/// instance.
///
/// Deterministic: identical inputs always yield an identical address. The
/// same address registers a worker under construction and routes messages to
/// it once alive.
pub fn resolve_address(metadata: &RegistryMetadata, name: &WorkerName) -> RoutingAddress {
    RoutingAddress::new(metadata.registry_id().clone(), name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DistributionStrategy;
    use crate::domain::identity::{NodeId, RegistryId};
    use crate::domain::substrate::{ClusterMembership, LookupReply, NameRegistry};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NeverLookedUp;

    #[async_trait]
    impl NameRegistry for NeverLookedUp {
        async fn lookup(&self, _registry: &RegistryId, _name: &WorkerName) -> LookupReply {
            panic!("address resolution must not touch the registry");
        }
    }

    impl ClusterMembership for NeverLookedUp {
        fn members(&self) -> Vec<NodeId> {
            panic!("address resolution must not touch membership");
        }
    }

    fn test_metadata() -> RegistryMetadata {
        let substrate = Arc::new(NeverLookedUp);
        RegistryMetadata::new(
            RegistryId::new("aegis.registry.billing"),
            DistributionStrategy::default(),
            substrate.clone(),
            substrate,
        )
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let metadata = test_metadata();
        let name = WorkerName::new("order-42");

        let first = resolve_address(&metadata, &name);
        let second = resolve_address(&metadata, &name);

        assert_eq!(first, second);
        assert_eq!(first.to_string(), "via:aegis.registry.billing/order-42");
    }

    #[test]
    fn test_resolution_has_no_side_effects() {
        // NeverLookedUp panics on any substrate access.
        let metadata = test_metadata();
        let _ = resolve_address(&metadata, &WorkerName::new("order-42"));
    }
}
