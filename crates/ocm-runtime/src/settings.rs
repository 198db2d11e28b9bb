// SPDX-License-Identifier: Apache-2.0
//! Process-wide settings loaded through a [`crate::config::ConfigService`].

use ocm_plugin::PluginManagerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The logical config key [`crate::runtime::initialize_runtime`] loads
/// settings under.
pub const SETTINGS_KEY: &str = "runtime";

/// Process-wide settings: worker pool size, plugin discovery paths and
/// timeouts, and the credential cache lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Bound on concurrent workers within one processing frontier; `None`
    /// defaults to hardware concurrency.
    pub worker_limit: Option<usize>,
    /// Directories scanned for plugin binaries at startup.
    pub plugin_search_paths: Vec<PathBuf>,
    /// Dial/TLS/header/startup timeouts and health-poll cadence.
    #[serde(default)]
    pub plugin_timeouts: PluginManagerConfig,
    /// How long a resolved credential stays cached before a caller should
    /// force a re-resolve.
    #[serde(with = "duration_secs")]
    pub credential_cache_ttl: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            worker_limit: None,
            plugin_search_paths: Vec::new(),
            plugin_timeouts: PluginManagerConfig::default(),
            credential_cache_ttl: Duration::from_secs(300),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
