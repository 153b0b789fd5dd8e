// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `aegis-registry` — Unique Worker Coordination Adapter
//!
//! The coordination layer that lets a cluster of AEGIS nodes agree on who
//! currently owns a uniquely-named worker, and resolves the races that occur
//! when two nodes try to start the same worker simultaneously.
//!
//! The crate sits between application code ("start, or attach to, the worker
//! for name N") and the distributed registry/supervisor substrate that
//! actually stores name→location mappings and supervises workers across the
//! cluster. The substrate is consumed through the ports in
//! [`domain::substrate`]; this crate holds no mutable state of its own
//! beyond the immutable [`RegistryMetadata`] built at bootstrap.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | names, handles, addresses, ports, errors |
//! | [`application`] | Application | bootstrap, address resolution, lookup, idempotent start |
//! | [`infrastructure`] | Infrastructure | in-memory substrate for tests and single-node runs |
//!
//! ## Start-and-Resolve in Short
//!
//! Bootstrap once per application via [`describe_registry`], then for each
//! uniquely-named worker call [`start_child`] (or [`start_linked`]). Exactly
//! one creation attempt is issued; every possible substrate reply is
//! classified into a started handle or a tagged [`StartError`]. Nothing is
//! retried internally — a stale registration surfaces as
//! [`StartError::RegisteredButDead`] so the caller's supervision policy can
//! decide.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    describe_registry, describe_supervisor, resolve_address, start_child, start_linked, whereis,
    ComponentKind, RegistryDescription, RestartStrategy, StartMode, StartupSpec, SupervisorSpec,
};
pub use domain::*;
