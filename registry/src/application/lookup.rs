// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Name Lookup
//!
//! Resolves a logical name to a live process handle or reports absence.
//! Replies outside the registry contract are logged and normalized to
//! absent: a fabricated handle must never escape this layer.

use crate::domain::handle::ProcessHandle;
use crate::domain::identity::WorkerName;
use crate::domain::metadata::RegistryMetadata;
use crate::domain::substrate::LookupReply;
use tracing::{debug, warn};

/// Look up the worker registered under `name`.
///
/// Returns `None` both when the registry reports the name absent and when it
/// answers with a shape outside its contract; the latter is logged at warn
/// level. Safe to call concurrently; the only suspension point is the
/// substrate round-trip.
pub async fn whereis(metadata: &RegistryMetadata, name: &WorkerName) -> Option<ProcessHandle> {
    match metadata
        .registry()
        .lookup(metadata.registry_id(), name)
        .await
    {
        LookupReply::Found(handle) => {
            debug!(name = %name, handle = %handle, "Name resolved");
            Some(handle)
        }
        LookupReply::NotFound => {
            debug!(name = %name, "Name not registered");
            None
        }
        LookupReply::Unrecognized(reply) => {
            warn!(
                name = %name,
                registry = %metadata.registry_id(),
                reply = %reply,
                "Unrecognized lookup reply from substrate; treating name as absent"
            );
            metrics::counter!("registry_lookup_unrecognized_total").increment(1);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DistributionStrategy;
    use crate::domain::identity::{NodeId, RegistryId};
    use crate::domain::substrate::{ClusterMembership, NameRegistry};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Registry scripted to answer every lookup with the same reply.
    struct ScriptedRegistry {
        reply: LookupReply,
    }

    #[async_trait]
    impl NameRegistry for ScriptedRegistry {
        async fn lookup(&self, _registry: &RegistryId, _name: &WorkerName) -> LookupReply {
            self.reply.clone()
        }
    }

    impl ClusterMembership for ScriptedRegistry {
        fn members(&self) -> Vec<NodeId> {
            vec![NodeId::new("node-a")]
        }
    }

    fn metadata_with(reply: LookupReply) -> RegistryMetadata {
        let registry = Arc::new(ScriptedRegistry { reply });
        RegistryMetadata::new(
            RegistryId::new("test-registry"),
            DistributionStrategy::default(),
            registry.clone(),
            registry,
        )
    }

    #[tokio::test]
    async fn test_found_reply_yields_handle() {
        let handle = ProcessHandle::spawned_on(NodeId::new("node-a"));
        let metadata = metadata_with(LookupReply::Found(handle.clone()));

        let resolved = whereis(&metadata, &WorkerName::new("order-42")).await;
        assert_eq!(resolved, Some(handle));
    }

    #[tokio::test]
    async fn test_not_found_reply_yields_absent() {
        let metadata = metadata_with(LookupReply::NotFound);
        assert!(whereis(&metadata, &WorkerName::new("order-42")).await.is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_reply_is_normalized_to_absent() {
        let metadata = metadata_with(LookupReply::Unrecognized(serde_json::json!({
            "pids": ["<0.42.0>", "<0.43.0>"]
        })));

        let resolved = whereis(&metadata, &WorkerName::new("order-42")).await;
        assert!(resolved.is_none(), "out-of-contract replies never surface as handles");
    }

    #[tokio::test]
    async fn test_lookup_is_idempotent() {
        let metadata = metadata_with(LookupReply::NotFound);
        let name = WorkerName::new("order-42");

        let first = whereis(&metadata, &name).await;
        let second = whereis(&metadata, &name).await;
        assert_eq!(first, second);
    }
}
