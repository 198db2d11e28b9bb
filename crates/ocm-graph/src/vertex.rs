// SPDX-License-Identifier: Apache-2.0
//! Vertex identity constraints and the snapshot type returned to callers.

use crate::state::{DiscoveryState, ProcessingState};
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier type a [`crate::dag::Dag`] can key vertices by.
///
/// Blanket-implemented for any type meeting the bound; `Ord` is required so
/// deterministic operations (`topological_sort`, tie-breaking in processing
/// frontiers) have a total order to sort by.
pub trait VertexId: Clone + Eq + Hash + Ord + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Ord + Debug + Send + Sync> VertexId for T {}

/// A point-in-time snapshot of one vertex: its id, attributes and current
/// state in both machines.
#[derive(Debug, Clone)]
pub struct Vertex<Id, T> {
    /// The vertex's identifier.
    pub id: Id,
    /// Caller-supplied payload.
    pub attributes: T,
    /// Where this vertex stands in the discovery machine.
    pub discovery_state: DiscoveryState,
    /// Where this vertex stands in the processing machine, if processing has
    /// touched it at all.
    pub processing_state: Option<ProcessingState>,
}
