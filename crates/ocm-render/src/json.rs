// SPDX-License-Identifier: Apache-2.0
//! Pretty-printed JSON serializers: a single object per vertex, or a JSON
//! array for a full list.

use crate::error::RenderError;
use crate::snapshot::VertexSnapshot;
use crate::traits::{ListSerializer, VertexSerializer};

/// Renders a vertex, or a list of vertices, as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl VertexSerializer for JsonSerializer {
    fn render_vertex(&self, vertex: &VertexSnapshot) -> Result<String, RenderError> {
        serde_json::to_string_pretty(vertex).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

impl ListSerializer for JsonSerializer {
    fn render_list(&self, vertices: &[VertexSnapshot]) -> Result<String, RenderError> {
        serde_json::to_string_pretty(vertices).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use ocm_graph::DiscoveryState;
    use serde_json::json;

    #[test]
    fn renders_list_as_json_array() {
        let vertices = vec![VertexSnapshot {
            id: json!("a"),
            attributes: json!({"x": 1}),
            discovery_state: DiscoveryState::Completed,
            processing_state: None,
        }];
        let rendered = JsonSerializer.render_list(&vertices).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["id"], json!("a"));
    }
}
