// SPDX-License-Identifier: Apache-2.0
//! A registered plugin binary and, once started, its live connection.

use crate::spec::PluginSpec;
use std::path::PathBuf;

/// A discovered, not-yet-started plugin binary.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Stable identifier, derived from the binary's file stem.
    pub id: String,
    /// Path to the executable.
    pub binary_path: PathBuf,
    /// The handshake document this binary reported.
    pub spec: PluginSpec,
}

/// Loopback address a started plugin's HTTP server listens on. The plugin
/// reports the port on its first line of standard output after startup.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint(pub std::net::SocketAddr);

impl Endpoint {
    /// The base URL for requests to this plugin.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.0)
    }
}
