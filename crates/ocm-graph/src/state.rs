// SPDX-License-Identifier: Apache-2.0
//! The two vertex state machines: discovery and processing.

/// `Discovering → Discovered → Completed`, with absorbing state `Error`.
///
/// Driven by [`crate::dag::Dag::discover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DiscoveryState {
    /// `visit` has been invoked but has not yet returned.
    Discovering,
    /// `visit` returned successfully; neighbours have been added.
    Discovered,
    /// This vertex and all its transitive neighbours have completed.
    Completed,
    /// `visit` failed, or a transitive neighbour's discovery failed.
    Error,
}

/// `Queued → Processing → Completed|Error`.
///
/// Driven by [`crate::dag::Dag::process_topology`] and
/// [`crate::dag::Dag::process_reverse_topology`]; runs independently of
/// [`DiscoveryState`] on the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ProcessingState {
    /// Vertex is in a frontier awaiting a worker slot.
    Queued,
    /// `processor.handle` has been invoked but has not yet returned.
    Processing,
    /// `processor.handle` returned successfully.
    Completed,
    /// `processor.handle` failed.
    Error,
}
