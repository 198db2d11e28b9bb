// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for the DAG engine.

use std::fmt::Debug;
use thiserror::Error;

/// Failure modes raised by [`crate::dag::Dag`] and its traversal/processing
/// entry points.
#[derive(Debug, Clone, Error)]
pub enum GraphError<Id: Debug + Clone> {
    /// Inserting an edge would close a cycle; the edge was rolled back.
    #[error("cycle detected: {path:?}")]
    Cycle {
        /// The cyclic path, starting and ending at the same vertex.
        path: Vec<Id>,
    },
    /// A referenced vertex is not present in the graph.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(Id),
    /// A vertex was already present where the caller required a fresh
    /// insert. Non-fatal in idempotent paths such as re-discovery, where
    /// [`crate::dag::Dag::add_vertex`]'s `bool` return is checked instead.
    #[error("vertex already exists: {0:?}")]
    AlreadyExists(Id),
    /// The traversal or processing run was cancelled before completion.
    #[error("cancelled")]
    Cancelled,
    /// A visitor or processor callback failed.
    #[error("callback failed: {0}")]
    Callback(String),
}
