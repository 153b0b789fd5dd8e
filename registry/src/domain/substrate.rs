// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Substrate Ports
//!
//! The interfaces the distributed registry/supervisor substrate must supply
//! for the adapter to run on top of it:
//!
//! - [`NameRegistry`] — name → handle lookups.
//! - [`DistributedSupervisor`] — physical worker creation across the cluster.
//! - [`ClusterMembership`] — snapshot of known cluster members.
//!
//! Reply shapes deliberately keep room for out-of-contract responses
//! ([`LookupReply::Unrecognized`], [`CreateOutcome::Created`] with no
//! handle): the adapter's job is to classify those, not to assume they
//! cannot happen.

use crate::domain::child::ChildSpec;
use crate::domain::handle::ProcessHandle;
use crate::domain::identity::{NodeId, RegistryId, WorkerName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substrate reply to a name lookup.
#[derive(Debug, Clone)]
pub enum LookupReply {
    Found(ProcessHandle),
    NotFound,
    /// Any reply outside the lookup contract, carried verbatim for
    /// diagnostics. Normalized to absent by the lookup use case.
    Unrecognized(serde_json::Value),
}

/// Substrate reply to a creation attempt.
///
/// `Created(None)` and `AlreadyStarted(None)` are distinct on purpose: the
/// first is the substrate violating its own success contract, the second a
/// stale or placeholder registration left by a racer. The starter classifies
/// them differently.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(Option<ProcessHandle>),
    AlreadyStarted(Option<ProcessHandle>),
    Failed(SubstrateFault),
}

/// Opaque substrate-reported failure, passed through to callers unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateFault {
    /// Machine-readable failure tag as the substrate reported it.
    pub code: String,
    pub message: String,
    /// Substrate-specific payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl SubstrateFault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for SubstrateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Name → handle lookup port of the substrate registry.
#[async_trait]
pub trait NameRegistry: Send + Sync {
    async fn lookup(&self, registry: &RegistryId, name: &WorkerName) -> LookupReply;
}

/// Worker-creation port of the substrate's distributed supervisor.
///
/// `create_child` goes through the supervisor's dynamic-child machinery;
/// `start_linked` is the direct linked-start path. Both answer with the same
/// outcome shape and the substrate remains the sole arbiter of which racing
/// creation attempt wins a name.
#[async_trait]
pub trait DistributedSupervisor: Send + Sync {
    async fn create_child(&self, spec: ChildSpec) -> CreateOutcome;
    async fn start_linked(&self, spec: ChildSpec) -> CreateOutcome;
}

/// Accessor for the current cluster membership snapshot.
pub trait ClusterMembership: Send + Sync {
    fn members(&self) -> Vec<NodeId>;
}
