// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod address;
pub mod bootstrap;
pub mod lookup;
pub mod starter;

// Re-export use cases for convenience
pub use address::resolve_address;
pub use bootstrap::{
    describe_registry, describe_supervisor, ComponentKind, RegistryDescription, RestartStrategy,
    StartupSpec, SupervisorSpec,
};
pub use lookup::whereis;
pub use starter::{start_child, start_linked, StartMode};
