// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Substrate
//!
//! Single-process implementation of the registry/supervisor ports, backed by
//! a `RwLock<HashMap>`. Suitable for tests, local development, and
//! single-node deployments; name→handle state is lost on restart.
//!
//! Uniqueness is enforced under one write lock, so racing `create_child`
//! calls serialize exactly like they would against the real substrate:
//! exactly one caller gets `Created`, every other gets `AlreadyStarted` with
//! whatever handle the winner registered.
//!
//! Test hooks mirror substrate behaviors the adapter must classify:
//! - [`kill`](InMemorySubstrate::kill) marks a worker dead but leaves the
//!   stale registration in place (crashed worker, down-event not yet
//!   processed).
//! - [`terminate`](InMemorySubstrate::terminate) tears the binding down as a
//!   clean exit would.
//! - [`fail_next_create`](InMemorySubstrate::fail_next_create) and
//!   [`unrecognized_next_lookup`](InMemorySubstrate::unrecognized_next_lookup)
//!   inject out-of-band replies.

use crate::domain::child::ChildSpec;
use crate::domain::handle::ProcessHandle;
use crate::domain::identity::{NodeId, RegistryId, WorkerName};
use crate::domain::substrate::{
    ClusterMembership, CreateOutcome, DistributedSupervisor, LookupReply, NameRegistry,
    SubstrateFault,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// One live (or stale) name binding.
#[derive(Debug, Clone)]
struct Registration {
    handle: ProcessHandle,
    registered_at: DateTime<Utc>,
}

/// In-memory registry/supervisor substrate.
#[derive(Clone)]
pub struct InMemorySubstrate {
    registrations: Arc<RwLock<HashMap<WorkerName, Registration>>>,
    members: Vec<NodeId>,
    placement_cursor: Arc<AtomicUsize>,
    injected_faults: Arc<Mutex<Vec<SubstrateFault>>>,
    injected_lookup_replies: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl InMemorySubstrate {
    pub fn new(members: Vec<NodeId>) -> Self {
        Self {
            registrations: Arc::new(RwLock::new(HashMap::new())),
            members,
            placement_cursor: Arc::new(AtomicUsize::new(0)),
            injected_faults: Arc::new(Mutex::new(Vec::new())),
            injected_lookup_replies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Single-member substrate for local development.
    pub fn single_node() -> Self {
        Self::new(vec![NodeId::new("local")])
    }

    /// Round-robin placement across members — the uniform distribution
    /// strategy, minus the network.
    fn place(&self) -> NodeId {
        let cursor = self.placement_cursor.fetch_add(1, Ordering::Relaxed);
        self.members[cursor % self.members.len()].clone()
    }

    fn name_for(spec: &ChildSpec) -> WorkerName {
        match &spec.registration {
            Some(address) => address.name().clone(),
            // Specs that bypassed the starter register under their spec id.
            None => WorkerName::new(spec.id.clone()),
        }
    }

    fn create(&self, spec: ChildSpec) -> CreateOutcome {
        if let Some(fault) = self.injected_faults.lock().unwrap().pop() {
            return CreateOutcome::Failed(fault);
        }

        let name = Self::name_for(&spec);
        let mut registrations = self.registrations.write().unwrap();
        if let Some(existing) = registrations.get(&name) {
            debug!(name = %name, handle = %existing.handle, "Name already registered");
            return CreateOutcome::AlreadyStarted(Some(existing.handle.clone()));
        }

        let handle = ProcessHandle::spawned_on(self.place());
        debug!(name = %name, handle = %handle, spec = %spec.id, "Registered worker");
        registrations.insert(
            name,
            Registration {
                handle: handle.clone(),
                registered_at: Utc::now(),
            },
        );
        CreateOutcome::Created(Some(handle))
    }

    /// Mark the worker dead without tearing down its registration, as after
    /// a crash whose down-event the registry has not yet processed.
    pub fn kill(&self, name: &WorkerName) -> bool {
        let registrations = self.registrations.read().unwrap();
        match registrations.get(name) {
            Some(registration) => {
                registration.handle.mark_dead();
                true
            }
            None => false,
        }
    }

    /// Tear down the binding as the substrate does on clean worker exit.
    pub fn terminate(&self, name: &WorkerName) -> bool {
        let mut registrations = self.registrations.write().unwrap();
        match registrations.remove(name) {
            Some(registration) => {
                registration.handle.mark_dead();
                true
            }
            None => false,
        }
    }

    /// Fail the next creation attempt with `fault`.
    pub fn fail_next_create(&self, fault: SubstrateFault) {
        self.injected_faults.lock().unwrap().push(fault);
    }

    /// Answer the next lookup with an out-of-contract reply shape.
    pub fn unrecognized_next_lookup(&self, reply: serde_json::Value) {
        self.injected_lookup_replies.lock().unwrap().push(reply);
    }

    pub fn registered_count(&self) -> usize {
        self.registrations.read().unwrap().len()
    }

    /// When the worker under `name` was registered, if it is.
    pub fn registered_at(&self, name: &WorkerName) -> Option<DateTime<Utc>> {
        self.registrations
            .read()
            .unwrap()
            .get(name)
            .map(|r| r.registered_at)
    }
}

#[async_trait]
impl NameRegistry for InMemorySubstrate {
    async fn lookup(&self, _registry: &RegistryId, name: &WorkerName) -> LookupReply {
        if let Some(reply) = self.injected_lookup_replies.lock().unwrap().pop() {
            return LookupReply::Unrecognized(reply);
        }

        match self.registrations.read().unwrap().get(name) {
            Some(registration) => LookupReply::Found(registration.handle.clone()),
            None => LookupReply::NotFound,
        }
    }
}

#[async_trait]
impl DistributedSupervisor for InMemorySubstrate {
    async fn create_child(&self, spec: ChildSpec) -> CreateOutcome {
        self.create(spec)
    }

    async fn start_linked(&self, spec: ChildSpec) -> CreateOutcome {
        self.create(spec)
    }
}

impl ClusterMembership for InMemorySubstrate {
    fn members(&self) -> Vec<NodeId> {
        self.members.clone()
    }
}
