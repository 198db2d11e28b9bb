// SPDX-License-Identifier: Apache-2.0
//! Ambient runtime wiring: process-wide settings, config storage and the
//! `initialize_runtime` entrypoint that constructs the shared scheme,
//! plugin manager and credential graph a binary crate dispatches through.

mod config;
mod error;
mod fs_store;
mod runtime;
mod settings;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use error::RuntimeError;
pub use fs_store::FsConfigStore;
pub use runtime::{initialize_runtime, Runtime};
pub use settings::{RuntimeSettings, SETTINGS_KEY};
