// SPDX-License-Identifier: Apache-2.0
//! `initialize_runtime`: load process-wide settings and construct the
//! shared registries every subsystem dispatches through.

use crate::config::{ConfigService, ConfigStore};
use crate::error::RuntimeError;
use crate::settings::{RuntimeSettings, SETTINGS_KEY};
use ocm_credentials::CredentialGraph;
use ocm_plugin::PluginManager;
use ocm_scheme::{Mode, Scheme};
use std::sync::Arc;

/// The process-wide handle returned by [`initialize_runtime`]: the type
/// scheme, plugin manager and credential graph every subsystem shares.
pub struct Runtime {
    /// The type registry every decode/convert call resolves against.
    pub scheme: Arc<Scheme>,
    /// The plugin manager backing transformation and other capabilities.
    pub plugins: Arc<PluginManager>,
    /// The credential resolution graph.
    pub credentials: Arc<CredentialGraph>,
    /// The settings this runtime was built from.
    pub settings: RuntimeSettings,
}

/// Load settings from `config` (falling back to [`RuntimeSettings::default`]
/// when none are stored yet) and construct the process-wide registries.
pub fn initialize_runtime<S: ConfigStore>(config: &ConfigService<S>) -> Result<Runtime, RuntimeError> {
    let settings = config.load::<RuntimeSettings>(SETTINGS_KEY)?.unwrap_or_default();

    let scheme = Arc::new(Scheme::new(Mode::Strict));
    let plugins = Arc::new(PluginManager::new(settings.plugin_timeouts));
    let credentials = Arc::new(CredentialGraph::new());

    tracing::info!(
        worker_limit = ?settings.worker_limit,
        plugin_search_paths = settings.plugin_search_paths.len(),
        "runtime initialized"
    );

    Ok(Runtime { scheme, plugins, credentials, settings })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fs_store::FsConfigStore;

    #[test]
    fn initializes_with_defaults_when_no_settings_stored() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigService::new(FsConfigStore::at(dir.path().to_path_buf()).unwrap());
        let runtime = initialize_runtime(&config).unwrap();
        assert_eq!(runtime.settings.worker_limit, None);
    }

    #[test]
    fn initializes_from_stored_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigService::new(FsConfigStore::at(dir.path().to_path_buf()).unwrap());
        let mut settings = RuntimeSettings::default();
        settings.worker_limit = Some(4);
        config.save(SETTINGS_KEY, &settings).unwrap();

        let runtime = initialize_runtime(&config).unwrap();
        assert_eq!(runtime.settings.worker_limit, Some(4));
    }
}
