// SPDX-License-Identifier: Apache-2.0
//! A point-in-time, format-agnostic view of a graph's vertices, built from
//! `ocm-graph` state without depending on any particular output shape.

use ocm_graph::{Dag, DiscoveryState, ProcessingState, VertexId};
use serde::Serialize;
use serde_json::Value as Json;

/// One vertex's id, attributes and state, ready to hand to a serializer.
#[derive(Debug, Clone, Serialize)]
pub struct VertexSnapshot {
    /// The vertex's id, rendered as JSON (a string for most `Id` types).
    pub id: Json,
    /// The vertex's attribute payload, rendered as JSON.
    pub attributes: Json,
    /// Where the vertex stands in the discovery state machine.
    pub discovery_state: DiscoveryState,
    /// Where the vertex stands in the processing state machine, if at all.
    pub processing_state: Option<ProcessingState>,
}

/// Take a snapshot of every vertex currently in `dag`, in id order.
pub fn snapshot_all<Id, T>(dag: &Dag<Id, T>) -> Vec<VertexSnapshot>
where
    Id: VertexId + Serialize,
    T: Serialize + Clone,
{
    dag.vertex_ids()
        .into_iter()
        .filter_map(|id| dag.vertex(&id))
        .map(|vertex| VertexSnapshot {
            id: serde_json::to_value(&vertex.id).unwrap_or(Json::Null),
            attributes: serde_json::to_value(&vertex.attributes).unwrap_or(Json::Null),
            discovery_state: vertex.discovery_state,
            processing_state: vertex.processing_state,
        })
        .collect()
}
