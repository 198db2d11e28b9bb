// SPDX-License-Identifier: Apache-2.0
//! The serializer interfaces concrete output formats implement.

use crate::error::RenderError;
use crate::snapshot::VertexSnapshot;

/// Renders a single vertex.
pub trait VertexSerializer: Send + Sync {
    /// Render one vertex snapshot to this format's text representation.
    fn render_vertex(&self, vertex: &VertexSnapshot) -> Result<String, RenderError>;
}

/// Renders a full list of vertices, for a tabular/tree/list redraw.
pub trait ListSerializer: Send + Sync {
    /// Render a full snapshot of the graph's vertices.
    fn render_list(&self, vertices: &[VertexSnapshot]) -> Result<String, RenderError>;
}
