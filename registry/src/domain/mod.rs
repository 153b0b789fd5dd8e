// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod address;
pub mod child;
pub mod config;
pub mod error;
pub mod handle;
pub mod identity;
pub mod metadata;
pub mod substrate;

pub use address::{AddressParseError, RoutingAddress};
pub use child::{ChildSpec, RestartPolicy};
pub use config::{AdapterConfig, DistributionStrategy};
pub use error::StartError;
pub use handle::ProcessHandle;
pub use identity::{ApplicationId, NodeId, RegistryId, WorkerModule, WorkerName};
pub use metadata::RegistryMetadata;
pub use substrate::{
    ClusterMembership, CreateOutcome, DistributedSupervisor, LookupReply, NameRegistry,
    SubstrateFault,
};
