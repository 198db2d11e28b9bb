// SPDX-License-Identifier: Apache-2.0
//! The DAG itself: vertex/edge storage, cycle-checked insertion, reversal
//! and deterministic topological sort.
//!
//! Storage uses `dashmap` for the live, concurrently-mutated graph (the
//! teacher's own `rmg-core::graph::GraphStore` is single-threaded and
//! unsuited to the concurrent discovery/processing this engine needs).

use crate::error::GraphError;
use crate::state::{DiscoveryState, ProcessingState};
use crate::vertex::{Vertex, VertexId};
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub(crate) struct Edge<Id> {
    pub(crate) to: Id,
    pub(crate) order_index: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeEntry<T> {
    attributes: T,
    discovery_state: DiscoveryState,
    processing_state: Option<ProcessingState>,
}

/// A directed acyclic graph over vertices identified by `Id` and carrying
/// attribute payload `T`.
///
/// Edge insertion runs cycle detection; a would-be-cyclic edge is rejected
/// and the graph is left unchanged. Concurrent traversal and processing live
/// in [`crate::traversal`] and [`crate::processing`] as methods on this type.
#[derive(Debug)]
pub struct Dag<Id: VertexId, T> {
    pub(crate) vertices: DashMap<Id, NodeEntry<T>>,
    pub(crate) edges: DashMap<Id, Vec<Edge<Id>>>,
    pub(crate) reverse_edges: DashMap<Id, Vec<Edge<Id>>>,
}

impl<Id: VertexId, T: Clone> Dag<Id, T> {
    /// An empty graph.
    pub fn new() -> Self {
        Self {
            vertices: DashMap::new(),
            edges: DashMap::new(),
            reverse_edges: DashMap::new(),
        }
    }

    /// Number of vertices currently in the graph.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True when the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertex ids, sorted for deterministic iteration.
    pub fn vertex_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.vertices.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Add a vertex with `Discovered` state. Idempotent: re-adding an
    /// existing id leaves its current attributes and state untouched.
    /// Returns `true` if the vertex was newly inserted, `false` if it
    /// already existed — callers that need the duplicate to be a hard
    /// error instead can map a `false` result to
    /// [`GraphError::AlreadyExists`].
    pub fn add_vertex(&self, id: Id, attributes: T) -> bool {
        self.add_vertex_with_state(id, attributes, DiscoveryState::Discovered)
    }

    pub(crate) fn add_vertex_with_state(&self, id: Id, attributes: T, state: DiscoveryState) -> bool {
        let mut inserted = false;
        self.vertices.entry(id).or_insert_with(|| {
            inserted = true;
            NodeEntry {
                attributes,
                discovery_state: state,
                processing_state: None,
            }
        });
        inserted
    }

    /// A snapshot of one vertex, if present.
    pub fn vertex(&self, id: &Id) -> Option<Vertex<Id, T>> {
        self.vertices.get(id).map(|e| Vertex {
            id: id.clone(),
            attributes: e.attributes.clone(),
            discovery_state: e.discovery_state,
            processing_state: e.processing_state,
        })
    }

    pub(crate) fn vertex_attributes(&self, id: &Id) -> Option<T> {
        self.vertices.get(id).map(|e| e.attributes.clone())
    }

    pub(crate) fn set_discovery_state(&self, id: &Id, state: DiscoveryState) {
        if let Some(mut entry) = self.vertices.get_mut(id) {
            entry.discovery_state = state;
        }
    }

    pub(crate) fn set_processing_state(&self, id: &Id, state: ProcessingState) {
        if let Some(mut entry) = self.vertices.get_mut(id) {
            entry.processing_state = Some(state);
        }
    }

    /// In-degree of `id`: the number of edges whose head is `id`.
    pub fn in_degree(&self, id: &Id) -> usize {
        self.reverse_edges.get(id).map_or(0, |e| e.len())
    }

    pub(crate) fn outgoing(&self, id: &Id) -> Option<Vec<Edge<Id>>> {
        self.edges.get(id).map(|e| e.clone())
    }

    /// Add an edge `from → to` with the given order index, used to break
    /// ties among siblings discovered from the same parent.
    ///
    /// Runs a DFS from `to` looking for a path back to `from`; if one
    /// exists the new edge would close a cycle, so it is rejected and the
    /// graph is left unchanged.
    pub fn add_edge(&self, from: Id, to: Id, order_index: usize) -> Result<(), GraphError<Id>> {
        if !self.vertices.contains_key(&from) {
            return Err(GraphError::VertexNotFound(from));
        }
        if !self.vertices.contains_key(&to) {
            return Err(GraphError::VertexNotFound(to));
        }
        if from == to {
            return Err(GraphError::Cycle { path: vec![from] });
        }
        if let Some(mut path) = self.path_exists(&to, &from) {
            path.insert(0, from);
            return Err(GraphError::Cycle { path });
        }
        self.edges
            .entry(from.clone())
            .or_default()
            .push(Edge { to: to.clone(), order_index });
        self.reverse_edges.entry(to).or_default().push(Edge { to: from, order_index });
        Ok(())
    }

    /// DFS search for a path from `from` to `to` over existing edges only.
    fn path_exists(&self, from: &Id, to: &Id) -> Option<Vec<Id>> {
        let mut stack = vec![from.clone()];
        let mut visited = BTreeSet::new();
        let mut parent: BTreeMap<Id, Id> = BTreeMap::new();

        while let Some(current) = stack.pop() {
            if current == *to {
                let mut path = vec![current.clone()];
                let mut cursor = current;
                while let Some(p) = parent.get(&cursor) {
                    path.push(p.clone());
                    cursor = p.clone();
                }
                path.reverse();
                return Some(path);
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(edges) = self.edges.get(&current) {
                for edge in edges.iter() {
                    if !visited.contains(&edge.to) {
                        parent.entry(edge.to.clone()).or_insert_with(|| current.clone());
                        stack.push(edge.to.clone());
                    }
                }
            }
        }
        None
    }

    pub(crate) fn clone_graph(&self) -> Self {
        let clone = Self::new();
        for entry in self.vertices.iter() {
            clone.vertices.insert(entry.key().clone(), entry.value().clone());
        }
        for entry in self.edges.iter() {
            clone.edges.insert(entry.key().clone(), entry.value().clone());
        }
        for entry in self.reverse_edges.iter() {
            clone.reverse_edges.insert(entry.key().clone(), entry.value().clone());
        }
        clone
    }

    /// A new graph with every edge inverted. Vertex identities and
    /// attributes are preserved; processing/discovery state is carried over
    /// from the source graph but has no bearing on the copy's own runs.
    pub fn reverse(&self) -> Self {
        let clone = self.clone_graph();
        Self {
            vertices: clone.vertices,
            edges: clone.reverse_edges,
            reverse_edges: clone.edges,
        }
    }

    /// A deterministic topological order: ties broken first by the edge's
    /// `order_index`, then by the ordered `Id` type.
    pub fn topological_sort(&self) -> Result<Vec<Id>, GraphError<Id>> {
        let mut in_degree: BTreeMap<Id, usize> =
            self.vertices.iter().map(|e| (e.key().clone(), self.in_degree(e.key()))).collect();
        let mut frontier: BTreeSet<Id> =
            in_degree.iter().filter(|(_, d)| **d == 0).map(|(id, _)| id.clone()).collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(id) = frontier.iter().next().cloned() {
            frontier.remove(&id);
            order.push(id.clone());
            if let Some(children) = self.edges.get(&id) {
                let mut sorted: Vec<&Edge<Id>> = children.iter().collect();
                sorted.sort_by_key(|e| (e.order_index, e.to.clone()));
                for edge in sorted {
                    if let Some(d) = in_degree.get_mut(&edge.to) {
                        *d -= 1;
                        if *d == 0 {
                            frontier.insert(edge.to.clone());
                        }
                    }
                }
            }
        }

        if order.len() != in_degree.len() {
            return Err(GraphError::Cycle { path: Vec::new() });
        }
        Ok(order)
    }
}

impl<Id: VertexId, T: Clone> Default for Dag<Id, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_rejects_self_loop() {
        let dag: Dag<u32, ()> = Dag::new();
        dag.add_vertex(1, ());
        let err = dag.add_edge(1, 1, 0).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
    }

    #[test]
    fn add_edge_rejects_cycle_and_rolls_back() {
        let dag: Dag<u32, ()> = Dag::new();
        dag.add_vertex(1, ());
        dag.add_vertex(2, ());
        dag.add_vertex(3, ());
        dag.add_edge(1, 2, 0).unwrap();
        dag.add_edge(2, 3, 0).unwrap();
        let err = dag.add_edge(3, 1, 0).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
        // rollback: the rejected edge must not have been inserted.
        assert_eq!(dag.in_degree(&1), 0);
    }

    #[test]
    fn topological_sort_orders_by_dependency_then_id() {
        let dag: Dag<u32, ()> = Dag::new();
        dag.add_vertex(1, ());
        dag.add_vertex(2, ());
        dag.add_vertex(3, ());
        dag.add_edge(1, 3, 0).unwrap();
        dag.add_edge(2, 3, 0).unwrap();
        let order = dag.topological_sort().unwrap();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn reverse_inverts_edges() {
        let dag: Dag<u32, ()> = Dag::new();
        dag.add_vertex(1, ());
        dag.add_vertex(2, ());
        dag.add_edge(1, 2, 0).unwrap();
        let reversed = dag.reverse();
        assert_eq!(reversed.in_degree(&1), 1);
        assert_eq!(reversed.in_degree(&2), 0);
    }

    #[test]
    fn add_vertex_is_idempotent() {
        let dag: Dag<u32, &'static str> = Dag::new();
        assert!(dag.add_vertex(1, "first"));
        assert!(!dag.add_vertex(1, "second"));
        assert_eq!(dag.vertex(&1).unwrap().attributes, "first");
    }

    #[test]
    fn add_vertex_return_signals_pre_existence_for_strict_callers() {
        let dag: Dag<u32, ()> = Dag::new();
        dag.add_vertex(1, ());
        let reinserted = dag.add_vertex(1, ());
        let result: Result<(), GraphError<u32>> = if reinserted { Ok(()) } else { Err(GraphError::AlreadyExists(1)) };
        assert!(matches!(result, Err(GraphError::AlreadyExists(1))));
    }
}
