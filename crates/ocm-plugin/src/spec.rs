// SPDX-License-Identifier: Apache-2.0
//! The `PluginSpec` handshake document every candidate binary prints to
//! standard output when invoked with `capabilities` as its sole argument.

use ocm_scheme::Type;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// One `(capability, type)` pair a plugin can serve, with the JSON schema
/// it expects requests of that type to satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityEntry {
    /// The capability name, e.g. `"component-version-repository"`.
    pub capability: String,
    /// The OCM type this entry handles.
    #[serde(rename = "type")]
    pub object_type: Type,
    /// JSON Schema describing the request payload.
    #[serde(rename = "jsonSchema")]
    pub json_schema: Json,
}

/// The full handshake document read from a plugin's standard output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Every capability this plugin serves.
    pub capabilities: Vec<CapabilityEntry>,
    /// Config object types this plugin accepts at startup.
    #[serde(rename = "supportedConfigTypes", default)]
    pub supported_config_types: Vec<Type>,
}
