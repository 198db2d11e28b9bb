// SPDX-License-Identifier: Apache-2.0
//! Timeout configuration for plugin startup and HTTP dispatch.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configurable timeouts governing plugin startup and dispatch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PluginManagerConfig {
    /// Timeout for establishing the HTTP connection to a started plugin.
    pub dial_timeout: Duration,
    /// Timeout for the TLS handshake, when the connection is over TLS.
    pub tls_timeout: Duration,
    /// Timeout for receiving response headers from a dispatch call.
    pub header_timeout: Duration,
    /// Total time to wait for a plugin to become healthy after spawning.
    pub startup_timeout: Duration,
    /// Interval between `/healthz` polls during startup.
    pub health_poll_interval: Duration,
    /// Total time budget for the health poll loop itself.
    pub health_poll_timeout: Duration,
}

impl Default for PluginManagerConfig {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(30),
            tls_timeout: Duration::from_secs(10),
            header_timeout: Duration::from_secs(30),
            startup_timeout: Duration::from_secs(5),
            health_poll_interval: Duration::from_millis(100),
            health_poll_timeout: Duration::from_secs(5),
        }
    }
}
