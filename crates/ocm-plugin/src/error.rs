// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for plugin discovery, startup and dispatch.

use ocm_scheme::{SchemeError, Type};
use thiserror::Error;

/// Failure modes raised by [`crate::manager::PluginManager`].
#[derive(Debug, Error)]
pub enum PluginError {
    /// The candidate binary's handshake output did not parse as a
    /// `PluginSpec`, or the process exited before producing one.
    #[error("handshake with {binary}: {reason}")]
    Handshake {
        /// Path to the plugin binary.
        binary: String,
        /// Why the handshake failed.
        reason: String,
    },
    /// Two plugins registered the same `(capability, type)` pair.
    #[error("capability {capability:?} already claims type {ty}")]
    DuplicateRegistration {
        /// The capability name.
        capability: String,
        /// The conflicting type.
        ty: Type,
    },
    /// No plugin or internal handler is registered for `(capability, type)`.
    #[error("no handler for capability {capability:?} and type {ty}")]
    UnknownCapability {
        /// The capability name.
        capability: String,
        /// The requested type.
        ty: Type,
    },
    /// The plugin process did not answer `/healthz` within the startup
    /// timeout.
    #[error("plugin {id} did not become healthy in time")]
    StartupTimeout {
        /// The plugin's id.
        id: String,
    },
    /// The plugin process could not be spawned or its connection set up.
    #[error("process error for plugin {id}: {reason}")]
    Process {
        /// The plugin's id.
        id: String,
        /// Underlying OS or I/O error text.
        reason: String,
    },
    /// The plugin's HTTP endpoint returned a non-2xx response.
    #[error("plugin returned HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The response body, for diagnostics.
        body: String,
    },
    /// Sending the shutdown signal to a running plugin failed.
    #[error("shutdown of plugin {id} failed: {reason}")]
    Shutdown {
        /// The plugin's id.
        id: String,
        /// Why the shutdown failed.
        reason: String,
    },
    /// The scheme rejected the request or response payload.
    #[error(transparent)]
    Scheme(#[from] SchemeError),
    /// The plugin's HTTP response body could not be decoded as JSON.
    #[error("decode error: {0}")]
    Decode(String),
    /// The call's context was cancelled before dispatch could begin.
    #[error("cancelled")]
    Cancelled,
}
