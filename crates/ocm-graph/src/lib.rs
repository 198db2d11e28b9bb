// SPDX-License-Identifier: Apache-2.0
//! Concurrent DAG engine.
//!
//! [`Dag`] supports two independent operations: [`Dag::discover`] builds a
//! graph by DFS-style traversal from a root with per-vertex dedup, and
//! [`Dag::process_topology`] / [`Dag::process_reverse_topology`] walk an
//! already-built graph in (reverse-)topological order with bounded worker
//! concurrency. Edge insertion is cycle-checked; a rejected edge leaves the
//! graph unchanged.

mod dag;
mod error;
mod processing;
mod state;
mod traversal;
mod vertex;

pub use dag::Dag;
pub use error::GraphError;
pub use state::{DiscoveryState, ProcessingState};
pub use tokio_util::sync::CancellationToken;
pub use vertex::{Vertex, VertexId};
