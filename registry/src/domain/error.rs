// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Start Errors
//!
//! Tagged outcomes of a failed unique start. Nothing here is retried by the
//! adapter itself; `RegisteredButDead` in particular exists so the caller's
//! own supervision policy can decide whether to try again.

use crate::domain::identity::WorkerName;
use crate::domain::substrate::SubstrateFault;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StartError {
    /// A registration for the name exists but no live worker backs it: the
    /// racer that won died before this caller could attach. Recoverable by
    /// retrying the start.
    #[error("name '{name}' is registered but its worker is no longer alive")]
    RegisteredButDead { name: WorkerName },

    /// The substrate claimed success without producing a usable handle.
    /// A contract violation, never silently treated as success.
    #[error("substrate reported success for '{name}' without a usable handle")]
    ReceivedEmptyHandle { name: WorkerName },

    /// Any other substrate-reported failure, propagated verbatim.
    #[error("substrate failure: {0}")]
    Passthrough(SubstrateFault),
}

impl StartError {
    /// Whether retrying the start can plausibly succeed without operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RegisteredButDead { .. })
    }
}
