// SPDX-License-Identifier: Apache-2.0
//! The top-level error every library crate's failures fold into at the
//! runtime/binary boundary.

use crate::config::ConfigError;
use ocm_credentials::CredentialError;
use ocm_plugin::PluginError;
use ocm_scheme::SchemeError;
use thiserror::Error;

/// Aggregates every component crate's error type behind one `#[from]`
/// boundary, the way a binary crate folds library errors together.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A scheme registration or conversion failed.
    #[error(transparent)]
    Scheme(#[from] SchemeError),
    /// A plugin discovery, startup or dispatch call failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// Credential resolution failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// Loading or saving process-wide settings failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
