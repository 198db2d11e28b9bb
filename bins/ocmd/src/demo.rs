// SPDX-License-Identifier: Apache-2.0
//! Stub transformation plugins and an in-memory credential store, standing
//! in for the out-of-process plugins and real credential backends a
//! deployment would wire up. Non-goals exclude a real OCI backend; these
//! exist only so `ocmd run`/`ocmd serve` have something to dispatch to.

use ocm_credentials::{CredentialGraph, Identity};
use ocm_plugin::{CancellationToken, InternalHandler, PluginError, PluginManager};
use ocm_scheme::Type;
use serde_json::{json, Value as Json};
use std::collections::HashMap;
use std::sync::Arc;

/// Register the demo handlers `ocmd run`/`ocmd serve` dispatch against:
/// `demo.ocm.software/identity` echoes its input, `demo.ocm.software/uppercase`
/// upper-cases a `text` field.
pub fn register_demo_plugins(plugins: &PluginManager) -> Result<(), PluginError> {
    plugins.register_internal(ocm_transform::CAPABILITY, identity_type()?, identity_handler())?;
    plugins.register_internal(ocm_transform::CAPABILITY, uppercase_type()?, uppercase_handler())?;
    Ok(())
}

/// Register a single in-memory credential consumer matching `type=demo`,
/// resolving to a fixed bearer token.
pub fn register_demo_credentials(credentials: &CredentialGraph) {
    let pattern = Identity::new([("type".to_string(), "demo".to_string())]);
    let token: HashMap<String, String> = [("token".to_string(), "demo-token".to_string())].into_iter().collect();
    credentials.register(pattern, ocm_credentials::static_resolver(token));
}

fn identity_type() -> Result<Type, PluginError> {
    Type::new("demo.ocm.software", "identity", "v1").map_err(PluginError::Scheme)
}

fn uppercase_type() -> Result<Type, PluginError> {
    Type::new("demo.ocm.software", "uppercase", "v1").map_err(PluginError::Scheme)
}

fn identity_handler() -> InternalHandler {
    Arc::new(|request| Box::pin(async move { Ok(request) }))
}

fn uppercase_handler() -> InternalHandler {
    Arc::new(|request| {
        Box::pin(async move {
            let text = request.get("text").and_then(Json::as_str).unwrap_or_default();
            Ok(json!({ "text": text.to_uppercase() }))
        })
    })
}
