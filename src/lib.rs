//! # Snapshot Gatherer
//!
//! Polls Mesos masters and slaves for their `/metrics/snapshot` counters and
//! hands the flattened results to an accumulator tagged by source host.
//!
//! ## Architecture
//!
//! - **`metrics`**: The per-role metric group registry, the group filter, the
//!   JSON flattener and the accumulator sink
//! - **`collectors`**: Endpoint polling, the per-role fan-out and the orchestrator
//!   that drives every enabled role
//! - **`error`**: Per-endpoint and aggregate gather errors
//!
//! ## Usage
//!
//! ```bash
//! # Poll the local master once
//! snapshot-gatherer --once
//!
//! # Poll two slaves every 30s, keeping only resource and task counters
//! snapshot-gatherer --slave 10.0.0.2 --slave 10.0.0.3:5051 \
//!                   --slave-collection resources --slave-collection tasks \
//!                   --interval 30s
//! ```

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod error;
pub mod logging;
pub mod metrics;

pub use collectors::*;
pub use error::{
    EndpointFailure,
    GatherError,
    PollError,
};
pub use metrics::*;
