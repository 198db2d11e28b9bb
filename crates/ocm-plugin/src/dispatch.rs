// SPDX-License-Identifier: Apache-2.0
//! Invoking a resolved capability: an internal handler runs in-process, an
//! external plugin is dispatched to over HTTP, starting it first if it is
//! not already running.

use crate::error::PluginError;
use crate::registry::Resolved;
use crate::startup::RunningPlugin;
use serde_json::Value as Json;

/// Invoke an already-resolved internal handler or running external plugin.
///
/// Callers that resolved an `External` plugin are responsible for having
/// started it first; `running` is the live connection to use for the call.
pub async fn dispatch(
    resolved: &Resolved,
    running: Option<&RunningPlugin>,
    capability: &str,
    method: &str,
    request: Json,
    credential: Option<&str>,
) -> Result<Json, PluginError> {
    match resolved {
        Resolved::Internal(handler) => handler(request).await,
        Resolved::External(descriptor) => {
            let running = running.ok_or_else(|| PluginError::Process {
                id: descriptor.id.clone(),
                reason: "plugin not started".into(),
            })?;
            dispatch_http(running, capability, method, request, credential).await
        }
    }
}

async fn dispatch_http(
    running: &RunningPlugin,
    capability: &str,
    method: &str,
    request: Json,
    credential: Option<&str>,
) -> Result<Json, PluginError> {
    let url = format!("{}/{capability}/{method}", running.endpoint.base_url());
    let mut req = running.client.post(&url).json(&request);
    if let Some(credential) = credential {
        req = req.header("Authorization", format!("Bearer {credential}"));
    }

    let resp = req
        .send()
        .await
        .map_err(|e| PluginError::Process { id: running.descriptor.id.clone(), reason: e.to_string() })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(PluginError::Http { status: status.as_u16(), body });
    }

    resp.json::<Json>().await.map_err(|e| PluginError::Decode(e.to_string()))
}
