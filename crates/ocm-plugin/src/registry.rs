// SPDX-License-Identifier: Apache-2.0
//! Per-capability registries: `external` plugins and `internal` handlers,
//! each a `(capability, type) → value` map. Registration is write-locked;
//! lookup is read-locked, the same reader/writer trade-off
//! `ocm-scheme::Scheme` makes for its prototype registry.

use crate::descriptor::PluginDescriptor;
use crate::error::PluginError;
use ocm_scheme::Type;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// A boxed, cloneable handler for an in-process plugin.
pub type InternalHandler =
    Arc<dyn Fn(Json) -> Pin<Box<dyn Future<Output = Result<Json, PluginError>> + Send>> + Send + Sync>;

fn poisoned<T>(lock: std::sync::LockResult<T>) -> T {
    lock.unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// `(capability, type)`-keyed registries of external and internal plugins.
#[derive(Default)]
pub struct Registries {
    external: RwLock<HashMap<(String, Type), PluginDescriptor>>,
    internal: RwLock<HashMap<(String, Type), InternalHandler>>,
}

impl Registries {
    /// An empty registry pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every `(capability, type)` pair `descriptor` declares.
    pub fn register_external(&self, descriptor: PluginDescriptor) -> Result<(), PluginError> {
        let mut external = poisoned(self.external.write());
        for entry in &descriptor.spec.capabilities {
            let key = (entry.capability.clone(), entry.object_type.clone());
            if external.contains_key(&key) {
                return Err(PluginError::DuplicateRegistration {
                    capability: entry.capability.clone(),
                    ty: entry.object_type.clone(),
                });
            }
        }
        for entry in &descriptor.spec.capabilities {
            let key = (entry.capability.clone(), entry.object_type.clone());
            external.insert(key, descriptor.clone());
        }
        Ok(())
    }

    /// Register an in-process handler for `(capability, type)`.
    pub fn register_internal(
        &self,
        capability: impl Into<String>,
        ty: Type,
        handler: InternalHandler,
    ) -> Result<(), PluginError> {
        let capability = capability.into();
        let mut internal = poisoned(self.internal.write());
        let key = (capability.clone(), ty.clone());
        if internal.contains_key(&key) {
            return Err(PluginError::DuplicateRegistration { capability, ty });
        }
        internal.insert(key, handler);
        Ok(())
    }

    /// Look up an in-process handler, if registered.
    pub fn internal(&self, capability: &str, ty: &Type) -> Option<InternalHandler> {
        poisoned(self.internal.read()).get(&(capability.to_string(), ty.clone())).cloned()
    }

    /// Look up an external plugin descriptor, if registered.
    pub fn external(&self, capability: &str, ty: &Type) -> Option<PluginDescriptor> {
        poisoned(self.external.read()).get(&(capability.to_string(), ty.clone())).cloned()
    }

    /// Resolve `(capability, type)` to a handler, preferring an internal one
    /// over an external plugin when both exist.
    pub fn resolve(&self, capability: &str, ty: &Type) -> Result<Resolved, PluginError> {
        if let Some(handler) = self.internal(capability, ty) {
            return Ok(Resolved::Internal(handler));
        }
        if let Some(descriptor) = self.external(capability, ty) {
            return Ok(Resolved::External(descriptor));
        }
        Err(PluginError::UnknownCapability { capability: capability.to_string(), ty: ty.clone() })
    }
}

/// The outcome of resolving a `(capability, type)` pair.
pub enum Resolved {
    /// An in-process handler, callable directly.
    Internal(InternalHandler),
    /// An external plugin, which may need to be started.
    External(PluginDescriptor),
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal(_) => f.debug_tuple("Internal").field(&"<handler>").finish(),
            Self::External(descriptor) => f.debug_tuple("External").field(descriptor).finish(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::spec::{CapabilityEntry, PluginSpec};
    use std::path::PathBuf;

    fn descriptor(id: &str, capability: &str, ty: &Type) -> PluginDescriptor {
        PluginDescriptor {
            id: id.to_string(),
            binary_path: PathBuf::from(format!("/plugins/{id}")),
            spec: PluginSpec {
                capabilities: vec![CapabilityEntry {
                    capability: capability.to_string(),
                    object_type: ty.clone(),
                    json_schema: Json::Null,
                }],
                supported_config_types: Vec::new(),
            },
        }
    }

    #[test]
    fn register_external_rejects_duplicate_capability() {
        let registries = Registries::new();
        let ty = Type::unversioned("repo").unwrap();
        registries.register_external(descriptor("a", "repository", &ty)).unwrap();
        let err = registries.register_external(descriptor("b", "repository", &ty)).unwrap_err();
        assert!(matches!(err, PluginError::DuplicateRegistration { .. }));
    }

    #[test]
    fn resolve_prefers_internal_over_external() {
        let registries = Registries::new();
        let ty = Type::unversioned("repo").unwrap();
        registries.register_external(descriptor("a", "repository", &ty)).unwrap();
        let handler: InternalHandler = Arc::new(|req| Box::pin(async move { Ok(req) }));
        registries.register_internal("repository", ty.clone(), handler).unwrap();

        let resolved = registries.resolve("repository", &ty).unwrap();
        assert!(matches!(resolved, Resolved::Internal(_)));
    }

    #[test]
    fn resolve_unknown_capability_errors() {
        let registries = Registries::new();
        let ty = Type::unversioned("repo").unwrap();
        let err = registries.resolve("repository", &ty).unwrap_err();
        assert!(matches!(err, PluginError::UnknownCapability { .. }));
    }
}
