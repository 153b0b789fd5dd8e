// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Process Handle
//!
//! Opaque reference to a running worker, minted by the substrate when it
//! physically spawns the process. The adapter layer never constructs handles
//! for workers it did not receive from the substrate; it only compares them
//! and reads their liveness.

use crate::domain::identity::NodeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Substrate-provided reference to a running worker.
///
/// Identity is the substrate-assigned `id`; equality and hashing ignore the
/// liveness flag, so a handle observed before and after its worker died still
/// compares equal. Cloning shares the liveness flag — when the substrate
/// marks a worker dead, every outstanding clone of its handle observes it.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    id: Uuid,
    node: NodeId,
    liveness: Arc<AtomicBool>,
}

impl ProcessHandle {
    /// Mint a live handle. Called by substrate implementations only; adapter
    /// code has no business creating handles.
    pub fn spawned_on(node: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            node,
            liveness: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Substrate-assigned identity of the worker process.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The cluster member hosting the worker.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Whether the worker behind this handle was still alive at the
    /// substrate's last accounting.
    pub fn is_alive(&self) -> bool {
        self.liveness.load(Ordering::Acquire)
    }

    /// Mark the worker dead. Substrate-side operation; visible through every
    /// clone of the handle.
    pub fn mark_dead(&self) {
        self.liveness.store(false, Ordering::Release);
    }
}

impl PartialEq for ProcessHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProcessHandle {}

impl Hash for ProcessHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.node)
    }
}
