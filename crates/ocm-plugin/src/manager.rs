// SPDX-License-Identifier: Apache-2.0
//! `PluginManager`: discovery, registration, lazy startup and dispatch for
//! external plugins, plus direct calls into internal handlers.

use crate::config::PluginManagerConfig;
use crate::descriptor::PluginDescriptor;
use crate::dispatch::dispatch;
use crate::error::PluginError;
use crate::registry::{InternalHandler, Registries, Resolved};
use crate::startup::{start, RunningPlugin};
use ocm_scheme::Type;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Owns plugin registries and the set of currently-running external plugin
/// processes, and dispatches capability calls to whichever of the two
/// answers a `(capability, type)` pair.
pub struct PluginManager {
    config: PluginManagerConfig,
    registries: Registries,
    running: Mutex<HashMap<String, RunningPlugin>>,
}

impl PluginManager {
    /// A manager with no plugins registered yet.
    pub fn new(config: PluginManagerConfig) -> Self {
        Self { config, registries: Registries::new(), running: Mutex::new(HashMap::new()) }
    }

    /// Run the handshake against `binary_path` and register every
    /// `(capability, type)` pair it declares.
    pub async fn discover_and_register(&self, binary_path: &Path) -> Result<PluginDescriptor, PluginError> {
        let descriptor = crate::discovery::discover(binary_path).await?;
        self.registries.register_external(descriptor.clone())?;
        Ok(descriptor)
    }

    /// Register an in-process handler for `(capability, type)`.
    pub fn register_internal(
        &self,
        capability: impl Into<String>,
        ty: Type,
        handler: InternalHandler,
    ) -> Result<(), PluginError> {
        self.registries.register_internal(capability, ty, handler)
    }

    /// Invoke `method` on the handler resolved for `(capability, ty)`,
    /// starting the backing plugin process first if it is external and not
    /// already running.
    ///
    /// Cancellation is checked once before dispatch begins; `cancellation`
    /// is not threaded further into the HTTP call itself, matching the
    /// plugin's own request/response timeouts as the mechanism for bounding
    /// an in-flight call.
    pub async fn invoke(
        &self,
        capability: &str,
        ty: &Type,
        method: &str,
        request: Json,
        credential: Option<&str>,
        cancellation: &CancellationToken,
    ) -> Result<Json, PluginError> {
        if cancellation.is_cancelled() {
            return Err(PluginError::Cancelled);
        }

        let resolved = self.registries.resolve(capability, ty)?;
        match &resolved {
            Resolved::Internal(_) => dispatch(&resolved, None, capability, method, request, credential).await,
            Resolved::External(descriptor) => {
                self.ensure_started(descriptor).await?;
                let running = self.running.lock().await;
                let handle = running.get(&descriptor.id);
                dispatch(&resolved, handle, capability, method, request, credential).await
            }
        }
    }

    async fn ensure_started(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let mut running = self.running.lock().await;
        if running.contains_key(&descriptor.id) {
            return Ok(());
        }
        let handle = start(descriptor.clone(), &self.config).await?;
        running.insert(descriptor.id.clone(), handle);
        Ok(())
    }

    /// Shut down every running external plugin, aggregating failures rather
    /// than stopping at the first one.
    pub async fn shutdown_all(&self, deadline: std::time::Duration) -> Vec<PluginError> {
        let mut running = self.running.lock().await;
        let mut errors = Vec::new();
        for (_, handle) in running.drain() {
            if let Err(e) = handle.shutdown(deadline).await {
                errors.push(e);
            }
        }
        errors
    }
}

/// A shared handle to a [`PluginManager`], cheap to clone across tasks.
pub type SharedPluginManager = Arc<PluginManager>;
