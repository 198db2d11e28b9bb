// SPDX-License-Identifier: Apache-2.0
//! Newline-delimited JSON: one compact object per vertex, one line per
//! vertex in a list render.

use crate::error::RenderError;
use crate::snapshot::VertexSnapshot;
use crate::traits::{ListSerializer, VertexSerializer};

/// Renders a vertex as one compact JSON line, or a list as one line per
/// vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonSerializer;

impl VertexSerializer for NdjsonSerializer {
    fn render_vertex(&self, vertex: &VertexSnapshot) -> Result<String, RenderError> {
        serde_json::to_string(vertex).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

impl ListSerializer for NdjsonSerializer {
    fn render_list(&self, vertices: &[VertexSnapshot]) -> Result<String, RenderError> {
        vertices.iter().map(|v| self.render_vertex(v)).collect::<Result<Vec<_>, _>>().map(|lines| lines.join("\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use ocm_graph::DiscoveryState;
    use serde_json::json;

    #[test]
    fn renders_one_line_per_vertex() {
        let vertices = vec![
            VertexSnapshot { id: json!("a"), attributes: json!({}), discovery_state: DiscoveryState::Completed, processing_state: None },
            VertexSnapshot { id: json!("b"), attributes: json!({}), discovery_state: DiscoveryState::Completed, processing_state: None },
        ];
        let rendered = NdjsonSerializer.render_list(&vertices).unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.lines().all(|line| serde_json::from_str::<serde_json::Value>(line).is_ok()));
    }
}
