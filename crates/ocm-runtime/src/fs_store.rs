// SPDX-License-Identifier: Apache-2.0
//! Filesystem-backed `ConfigStore` rooted at the platform config directory.

use crate::config::{ConfigError, ConfigStore};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Stores configs as JSON files under the platform config directory
/// (e.g. `~/.config/ocm` on Linux).
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// A store rooted at the user config directory for this application.
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("dev", "ocm", "ocm")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::at(proj.config_dir().to_path_buf())
    }

    /// A store rooted at an explicit directory, for tests and overrides.
    pub fn at(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}
