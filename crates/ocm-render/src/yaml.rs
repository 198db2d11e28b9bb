// SPDX-License-Identifier: Apache-2.0
//! YAML serializers, for output shapes that read better as a document than
//! as a single-line payload.

use crate::error::RenderError;
use crate::snapshot::VertexSnapshot;
use crate::traits::{ListSerializer, VertexSerializer};

/// Renders a vertex, or a list of vertices, as a YAML document.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSerializer;

impl VertexSerializer for YamlSerializer {
    fn render_vertex(&self, vertex: &VertexSnapshot) -> Result<String, RenderError> {
        serde_yaml::to_string(vertex).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

impl ListSerializer for YamlSerializer {
    fn render_list(&self, vertices: &[VertexSnapshot]) -> Result<String, RenderError> {
        serde_yaml::to_string(vertices).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use ocm_graph::DiscoveryState;
    use serde_json::json;

    #[test]
    fn renders_list_as_yaml_sequence() {
        let vertices = vec![VertexSnapshot {
            id: json!("a"),
            attributes: json!({"x": 1}),
            discovery_state: DiscoveryState::Completed,
            processing_state: None,
        }];
        let rendered = YamlSerializer.render_list(&vertices).unwrap();
        assert!(rendered.contains("id: a"));
    }
}
