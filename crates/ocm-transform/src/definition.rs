// SPDX-License-Identifier: Apache-2.0
//! The input document: an unordered list of typed transformation steps.

use ocm_scheme::Type;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// One step in a transformation graph: an id, the type of transformation to
/// run, and its schemaless spec (which may embed `${...}` expressions
/// referencing other steps' outputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationStep {
    /// Unique id within the enclosing definition.
    pub id: String,
    /// The transformation type, resolved against the plugin manager's
    /// `"transformation"` capability.
    #[serde(rename = "type")]
    pub object_type: Type,
    /// The step's schemaless configuration.
    pub spec: Json,
}

/// A full transformation graph definition, as read from a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransformationGraphDefinition {
    /// Every step to build into the graph.
    pub steps: Vec<TransformationStep>,
}
