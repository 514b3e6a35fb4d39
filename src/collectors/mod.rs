//! # Collectors Module
//!
//! This module contains the snapshot collection logic.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: Defines the interface for all inputs
//! - **`endpoint_poller`**: Fetches, filters and flattens one endpoint's snapshot
//! - **`SnapshotCollector`**: Fans a gather out over every endpoint of one role and
//!   aggregates the failures
//! - **`Orchestrator`**: Creates the shared HTTP client and accumulator and drives one
//!   `SnapshotCollector` per enabled role

pub mod collector;
pub mod endpoint_poller;
pub mod orchestrator;
pub mod snapshot_collector;

// Re-export the main types for easy access
pub use collector::Collector;
pub use endpoint_poller::{
    poll_endpoint,
    Endpoint,
    SnapshotClient,
};
pub use orchestrator::{
    CycleReport,
    Orchestrator,
    RoleError,
};
pub use snapshot_collector::SnapshotCollector;
