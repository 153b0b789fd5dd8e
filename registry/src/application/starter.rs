// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Idempotent Starter
//!
//! The start-and-resolve protocol: issue exactly one creation attempt for a
//! uniquely-named worker and classify every possible substrate reply into a
//! single well-defined outcome.
//!
//! ## Classification Table
//! | Substrate outcome | Result |
//! |-------------------|--------|
//! | created, live handle | `Ok(handle)` — this caller won the race |
//! | already started, live handle | `Ok(handle)` — attach to the winner |
//! | already started, dead/empty placeholder | re-lookup; live → `Ok`, absent → `RegisteredButDead` |
//! | created, no handle | `ReceivedEmptyHandle` — substrate contract violation |
//! | failed | `Passthrough` — not this layer's concern |
//!
//! No retry happens here. `RegisteredButDead` is surfaced precisely so the
//! caller's own supervision policy can decide to retry.

use crate::application::address::resolve_address;
use crate::application::lookup::whereis;
use crate::domain::child::ChildSpec;
use crate::domain::error::StartError;
use crate::domain::handle::ProcessHandle;
use crate::domain::identity::{WorkerModule, WorkerName};
use crate::domain::metadata::RegistryMetadata;
use crate::domain::substrate::{CreateOutcome, DistributedSupervisor};
use tracing::{debug, info, warn};

/// How the worker is physically created: through the supervisor's
/// dynamic-child machinery or via a direct linked start. Race resolution is
/// identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    CreateChild,
    StartLinked,
}

/// Start (or attach to) the uniquely-named worker described by `spec` via
/// the supervisor's dynamic-child API.
pub async fn start_child(
    metadata: &RegistryMetadata,
    name: &WorkerName,
    supervisor: &dyn DistributedSupervisor,
    spec: ChildSpec,
) -> Result<ProcessHandle, StartError> {
    start_unique(metadata, name, supervisor, spec, StartMode::CreateChild).await
}

/// Start (or attach to) the uniquely-named worker via a direct linked start
/// of `module` with `init_args`.
pub async fn start_linked(
    metadata: &RegistryMetadata,
    name: &WorkerName,
    supervisor: &dyn DistributedSupervisor,
    module: &WorkerModule,
    init_args: serde_json::Value,
) -> Result<ProcessHandle, StartError> {
    let spec = ChildSpec::for_worker(module.clone(), name, init_args);
    start_unique(metadata, name, supervisor, spec, StartMode::StartLinked).await
}

/// Issue exactly one creation attempt and classify the substrate's reply.
///
/// Whichever concurrent caller the substrate lets win, every other caller
/// converges on that winner's handle or on `RegisteredButDead` — never on a
/// silently wrong success.
async fn start_unique(
    metadata: &RegistryMetadata,
    name: &WorkerName,
    supervisor: &dyn DistributedSupervisor,
    spec: ChildSpec,
    mode: StartMode,
) -> Result<ProcessHandle, StartError> {
    let address = resolve_address(metadata, name);
    let spec = spec.registered_at(address);

    let outcome = match mode {
        StartMode::CreateChild => supervisor.create_child(spec).await,
        StartMode::StartLinked => supervisor.start_linked(spec).await,
    };

    match outcome {
        CreateOutcome::Created(Some(handle)) => {
            info!(name = %name, handle = %handle, ?mode, "Worker started");
            Ok(handle)
        }
        CreateOutcome::Created(None) => {
            warn!(name = %name, "Substrate reported success without a handle");
            metrics::counter!("registry_start_empty_success_total").increment(1);
            Err(StartError::ReceivedEmptyHandle { name: name.clone() })
        }
        CreateOutcome::AlreadyStarted(Some(handle)) if handle.is_alive() => {
            info!(name = %name, handle = %handle, "Attached to already-running worker");
            Ok(handle)
        }
        CreateOutcome::AlreadyStarted(placeholder) => {
            // The winner of the race is already gone; the registration record
            // may be stale or may have been rewritten by yet another racer.
            debug!(
                name = %name,
                placeholder = %placeholder.as_ref().map(|h| h.to_string()).unwrap_or_default(),
                "Registration exists without a live worker; re-resolving"
            );
            resolve_stale_registration(metadata, name).await
        }
        CreateOutcome::Failed(fault) => {
            debug!(name = %name, fault = %fault, "Substrate refused creation; passing through");
            Err(StartError::Passthrough(fault))
        }
    }
}

/// Second look after an already-started reply carried no live handle.
async fn resolve_stale_registration(
    metadata: &RegistryMetadata,
    name: &WorkerName,
) -> Result<ProcessHandle, StartError> {
    match whereis(metadata, name).await {
        Some(handle) if handle.is_alive() => {
            info!(name = %name, handle = %handle, "Attached to re-resolved worker");
            Ok(handle)
        }
        _ => {
            warn!(name = %name, "Name registered but no live worker backs it");
            metrics::counter!("registry_start_stale_registration_total").increment(1);
            Err(StartError::RegisteredButDead { name: name.clone() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DistributionStrategy;
    use crate::domain::identity::{NodeId, RegistryId};
    use crate::domain::substrate::{
        ClusterMembership, LookupReply, NameRegistry, SubstrateFault,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Supervisor scripted with a fixed sequence of creation outcomes.
    struct ScriptedSupervisor {
        outcomes: Mutex<Vec<CreateOutcome>>,
        create_calls: AtomicUsize,
        seen_specs: Mutex<Vec<ChildSpec>>,
    }

    impl ScriptedSupervisor {
        fn new(outcomes: Vec<CreateOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                create_calls: AtomicUsize::new(0),
                seen_specs: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, spec: ChildSpec) -> CreateOutcome {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_specs.lock().unwrap().push(spec);
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    #[async_trait]
    impl DistributedSupervisor for ScriptedSupervisor {
        async fn create_child(&self, spec: ChildSpec) -> CreateOutcome {
            self.next(spec)
        }

        async fn start_linked(&self, spec: ChildSpec) -> CreateOutcome {
            self.next(spec)
        }
    }

    /// Registry scripted with a fixed reply.
    struct ScriptedRegistry {
        reply: LookupReply,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl NameRegistry for ScriptedRegistry {
        async fn lookup(&self, _registry: &RegistryId, _name: &WorkerName) -> LookupReply {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    impl ClusterMembership for ScriptedRegistry {
        fn members(&self) -> Vec<NodeId> {
            vec![NodeId::new("node-a")]
        }
    }

    fn metadata_with(reply: LookupReply) -> (RegistryMetadata, Arc<ScriptedRegistry>) {
        let registry = Arc::new(ScriptedRegistry {
            reply,
            lookups: AtomicUsize::new(0),
        });
        let metadata = RegistryMetadata::new(
            RegistryId::new("test-registry"),
            DistributionStrategy::default(),
            registry.clone(),
            registry.clone(),
        );
        (metadata, registry)
    }

    fn order_spec() -> ChildSpec {
        ChildSpec::for_worker(
            WorkerModule::new("billing.worker"),
            &WorkerName::new("order-42"),
            serde_json::json!({"order": 42}),
        )
    }

    fn live_handle() -> ProcessHandle {
        ProcessHandle::spawned_on(NodeId::new("node-a"))
    }

    #[tokio::test]
    async fn test_winner_gets_created_handle() {
        let handle = live_handle();
        let supervisor =
            ScriptedSupervisor::new(vec![CreateOutcome::Created(Some(handle.clone()))]);
        let (metadata, registry) = metadata_with(LookupReply::NotFound);

        let started = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap();

        assert_eq!(started, handle);
        assert_eq!(supervisor.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            registry.lookups.load(Ordering::SeqCst),
            0,
            "the winner path never consults the registry"
        );
    }

    #[tokio::test]
    async fn test_loser_attaches_to_live_winner() {
        let winner = live_handle();
        let supervisor =
            ScriptedSupervisor::new(vec![CreateOutcome::AlreadyStarted(Some(winner.clone()))]);
        let (metadata, _) = metadata_with(LookupReply::NotFound);

        let attached = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap();

        assert_eq!(attached, winner);
    }

    #[tokio::test]
    async fn test_dead_placeholder_resolves_through_lookup() {
        let dead = live_handle();
        dead.mark_dead();
        let replacement = live_handle();

        let supervisor =
            ScriptedSupervisor::new(vec![CreateOutcome::AlreadyStarted(Some(dead))]);
        let (metadata, registry) = metadata_with(LookupReply::Found(replacement.clone()));

        let attached = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap();

        assert_eq!(attached, replacement);
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_registration_without_live_worker_errors() {
        let supervisor = ScriptedSupervisor::new(vec![CreateOutcome::AlreadyStarted(None)]);
        let (metadata, _) = metadata_with(LookupReply::NotFound);

        let err = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap_err();

        assert!(matches!(err, StartError::RegisteredButDead { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_relookup_finding_dead_handle_still_errors() {
        let dead = live_handle();
        dead.mark_dead();

        let supervisor = ScriptedSupervisor::new(vec![CreateOutcome::AlreadyStarted(None)]);
        let (metadata, _) = metadata_with(LookupReply::Found(dead));

        let err = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap_err();

        assert!(matches!(err, StartError::RegisteredButDead { .. }));
    }

    #[tokio::test]
    async fn test_empty_success_is_a_contract_violation() {
        let supervisor = ScriptedSupervisor::new(vec![CreateOutcome::Created(None)]);
        let (metadata, registry) = metadata_with(LookupReply::NotFound);

        let err = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap_err();

        assert!(matches!(err, StartError::ReceivedEmptyHandle { .. }));
        assert_eq!(
            registry.lookups.load(Ordering::SeqCst),
            0,
            "empty success is never patched up via lookup"
        );
    }

    #[tokio::test]
    async fn test_substrate_failure_passes_through_verbatim() {
        let fault = SubstrateFault::new("timeout", "no quorum within 5000ms")
            .with_detail(serde_json::json!({"waited_ms": 5000}));
        let supervisor = ScriptedSupervisor::new(vec![CreateOutcome::Failed(fault.clone())]);
        let (metadata, _) = metadata_with(LookupReply::NotFound);

        let err = start_child(&metadata, &WorkerName::new("order-42"), &supervisor, order_spec())
            .await
            .unwrap_err();

        match err {
            StartError::Passthrough(got) => assert_eq!(got, fault),
            other => panic!("expected passthrough, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_starter_injects_registration_address() {
        let supervisor =
            ScriptedSupervisor::new(vec![CreateOutcome::Created(Some(live_handle()))]);
        let (metadata, _) = metadata_with(LookupReply::NotFound);
        let name = WorkerName::new("order-42");

        start_child(&metadata, &name, &supervisor, order_spec()).await.unwrap();

        let seen = supervisor.seen_specs.lock().unwrap();
        let registration = seen[0].registration.as_ref().expect("address injected");
        assert_eq!(registration.to_string(), "via:test-registry/order-42");
    }

    #[tokio::test]
    async fn test_start_linked_shares_the_classification() {
        let supervisor = ScriptedSupervisor::new(vec![CreateOutcome::AlreadyStarted(None)]);
        let (metadata, _) = metadata_with(LookupReply::NotFound);

        let err = start_linked(
            &metadata,
            &WorkerName::new("order-42"),
            &supervisor,
            &WorkerModule::new("billing.worker"),
            serde_json::json!({"order": 42}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StartError::RegisteredButDead { .. }));

        let seen = supervisor.seen_specs.lock().unwrap();
        assert_eq!(seen[0].id, "billing.worker:order-42");
    }
}
