// SPDX-License-Identifier: Apache-2.0
//! The scheme: a `Type ⇄ prototype` registry with alias support, strict/open
//! modes, two-pass decode and type-reconciling convert.
//!
//! Dispatch is reflection-free: each prototype is registered with an
//! explicit `(decode, new, to_json)` vtable of plain `fn` pointers, the way
//! `rmg-core::rule::RewriteRule` wires matcher/executor/footprint callbacks
//! for its rewrite rules.

use crate::error::SchemeError;
use crate::type_::Type;
use crate::value::{TypedValue, Unstructured};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Whether unknown types are rejected or pass through as [`crate::value::Raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unknown types are rejected with [`SchemeError::UnknownType`].
    Strict,
    /// Unknown types pass through undecoded as `Raw`.
    Open,
}

/// Encoding format for [`Scheme::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

/// Opaque handle identifying one registered prototype (possibly aliased
/// under several [`Type`]s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PrototypeId(u64);

/// Plain-`fn`-pointer vtable for one registered prototype. No trait objects,
/// no reflection: registration monomorphizes these from the concrete `T`.
#[derive(Clone, Copy)]
struct PrototypeVTable {
    new_instance: fn() -> Box<dyn TypedValue>,
    decode_json: fn(&[u8]) -> Result<Box<dyn TypedValue>, SchemeError>,
    decode_yaml: fn(&[u8]) -> Result<Box<dyn TypedValue>, SchemeError>,
    from_json_value: fn(Json) -> Result<Box<dyn TypedValue>, SchemeError>,
}

fn decode_json_impl<T>(bytes: &[u8]) -> Result<Box<dyn TypedValue>, SchemeError>
where
    T: TypedValue + DeserializeOwned + 'static,
{
    let value: T = serde_json::from_slice(bytes).map_err(|e| SchemeError::DecodeError(e.to_string()))?;
    Ok(Box::new(value))
}

fn decode_yaml_impl<T>(bytes: &[u8]) -> Result<Box<dyn TypedValue>, SchemeError>
where
    T: TypedValue + DeserializeOwned + 'static,
{
    let value: T = serde_yaml::from_slice(bytes).map_err(|e| SchemeError::DecodeError(e.to_string()))?;
    Ok(Box::new(value))
}

fn from_json_value_impl<T>(json: Json) -> Result<Box<dyn TypedValue>, SchemeError>
where
    T: TypedValue + DeserializeOwned + 'static,
{
    let value: T = serde_json::from_value(json).map_err(|e| SchemeError::DecodeError(e.to_string()))?;
    Ok(Box::new(value))
}

fn new_instance_impl<T>() -> Box<dyn TypedValue>
where
    T: TypedValue + Default + 'static,
{
    Box::new(T::default())
}

/// Minimal shim used during the type-discovery decode pass.
#[derive(serde::Deserialize)]
struct TypeOnly {
    #[serde(rename = "type")]
    object_type: Option<Type>,
}

/// A `Type ⇄ prototype` registry with alias support.
///
/// Aliasing is a bimap: several [`Type`]s may point at the same prototype
/// (e.g. a versioned and unversioned spelling of the same schema).
/// Registration is rare and reader-writer-locked (teacher's pattern: "reader
/// writer lock; registration is rare, lookups frequent", `§5`).
pub struct Scheme {
    mode: Mode,
    prototypes: RwLock<HashMap<PrototypeId, PrototypeVTable>>,
    aliases: RwLock<HashMap<Type, PrototypeId>>,
    next_id: AtomicU64,
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheme").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl Scheme {
    /// Construct an empty scheme in the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            prototypes: RwLock::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// This scheme's strict/open mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Register a prototype `T` under one or more types (aliases).
    ///
    /// Fails with [`SchemeError::AlreadyRegistered`] if any of `types` is
    /// already bound, without mutating the registry (errors are
    /// recoverable, per spec §4.A failure semantics).
    pub fn register<T>(&self, types: &[Type]) -> Result<(), SchemeError>
    where
        T: TypedValue + Serialize + DeserializeOwned + Default + 'static,
    {
        if types.is_empty() {
            return Err(SchemeError::InvalidTypeString(
                "register requires at least one type".into(),
            ));
        }
        let aliases = self.aliases.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        for ty in types {
            if aliases.contains_key(ty) {
                return Err(SchemeError::AlreadyRegistered(ty.clone()));
            }
        }
        drop(aliases);

        let id = PrototypeId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let vtable = PrototypeVTable {
            new_instance: new_instance_impl::<T>,
            decode_json: decode_json_impl::<T>,
            decode_yaml: decode_yaml_impl::<T>,
            from_json_value: from_json_value_impl::<T>,
        };

        let mut prototypes = self.prototypes.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut aliases = self.aliases.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Re-check under the write lock: another writer may have registered
        // one of these types between our read-check and acquiring the locks.
        for ty in types {
            if aliases.contains_key(ty) {
                return Err(SchemeError::AlreadyRegistered(ty.clone()));
            }
        }
        prototypes.insert(id, vtable);
        for ty in types {
            aliases.insert(ty.clone(), id);
        }
        Ok(())
    }

    fn lookup(&self, ty: &Type) -> Option<PrototypeVTable> {
        let aliases = self.aliases.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = aliases.get(ty)?;
        let prototypes = self.prototypes.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        prototypes.get(id).copied()
    }

    /// Return the canonical type for `value`: the registered alias matching
    /// its currently-declared type.
    pub fn type_for(&self, value: &dyn TypedValue) -> Result<Type, SchemeError> {
        let declared = value.object_type();
        let aliases = self.aliases.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        if aliases.contains_key(&declared) {
            Ok(declared)
        } else {
            Err(SchemeError::UnknownType(declared))
        }
    }

    /// Construct a zero value for `ty`. In strict mode an unknown type is an
    /// error; in open mode it falls back to an empty [`crate::value::Raw`].
    pub fn new_object(&self, ty: &Type) -> Result<Box<dyn TypedValue>, SchemeError> {
        match self.lookup(ty) {
            Some(vt) => {
                let mut obj = (vt.new_instance)();
                obj.set_object_type(ty.clone());
                Ok(obj)
            }
            None => match self.mode {
                Mode::Strict => Err(SchemeError::UnknownType(ty.clone())),
                Mode::Open => Ok(Box::new(crate::value::Raw::new(ty.clone(), Vec::new()))),
            },
        }
    }

    /// Complete a partially-populated type: if `value`'s declared type is
    /// not directly registered, search for an alias matching on
    /// `(group, name)` alone, preferring a versioned alias over an
    /// unversioned one, and adopt it.
    pub fn default_value(&self, value: &mut dyn TypedValue) -> Result<(), SchemeError> {
        let declared = value.object_type();
        {
            let aliases = self.aliases.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            if aliases.contains_key(&declared) {
                return Ok(());
            }
        }
        let aliases = self.aliases.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut candidates: Vec<&Type> = aliases
            .keys()
            .filter(|t| t.group() == declared.group() && t.name() == declared.name())
            .collect();
        if candidates.is_empty() {
            return match self.mode {
                Mode::Strict => Err(SchemeError::UnknownType(declared)),
                Mode::Open => Ok(()),
            };
        }
        // Versioned preferred over unversioned; among versioned, longest
        // (most specific) version string wins deterministically.
        candidates.sort_by_key(|t| (t.is_unversioned(), std::cmp::Reverse(t.version().len())));
        let chosen = candidates[0].clone();
        value.set_object_type(chosen);
        Ok(())
    }

    /// Two-pass decode: buffer the bytes, peek the `type` field, then
    /// re-decode the full payload into the resolved prototype.
    pub fn decode(&self, bytes: &[u8], format: Format) -> Result<Box<dyn TypedValue>, SchemeError> {
        let type_only: TypeOnly = match format {
            Format::Json => {
                serde_json::from_slice(bytes).map_err(|e| SchemeError::DecodeError(e.to_string()))?
            }
            Format::Yaml => {
                serde_yaml::from_slice(bytes).map_err(|e| SchemeError::DecodeError(e.to_string()))?
            }
        };
        let ty = type_only.object_type.ok_or(SchemeError::MissingType)?;

        match self.lookup(&ty) {
            Some(vt) => match format {
                Format::Json => (vt.decode_json)(bytes),
                Format::Yaml => (vt.decode_yaml)(bytes),
            },
            None => match self.mode {
                Mode::Strict => Err(SchemeError::UnknownType(ty)),
                Mode::Open => Ok(Box::new(crate::value::Raw::new(ty, bytes.to_vec()))),
            },
        }
    }

    /// Convert `src` into the prototype registered for `dst_type`.
    ///
    /// Allowed paths: Raw→concrete (re-decode), concrete→Unstructured
    /// (serialize to JSON, wrap), concrete→concrete when the types match
    /// exactly (plain deep copy).
    pub fn convert(
        &self,
        src: &dyn TypedValue,
        dst_type: &Type,
    ) -> Result<Box<dyn TypedValue>, SchemeError> {
        let src_type = src.object_type();

        if src_type == *dst_type {
            let mut copy = src.deep_copy();
            copy.set_object_type(dst_type.clone());
            return Ok(copy);
        }

        if let Some(raw) = src.as_any().downcast_ref::<crate::value::Raw>() {
            return match self.lookup(dst_type) {
                Some(vt) => (vt.decode_json)(&raw.data),
                None => Err(SchemeError::TypeMismatch {
                    from: src_type,
                    to: dst_type.clone(),
                }),
            };
        }

        if let Some(unstructured) = src.as_any().downcast_ref::<Unstructured>() {
            if let Some(vt) = self.lookup(dst_type) {
                let mut json = Json::Object(
                    unstructured
                        .fields
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                );
                json["type"] = Json::String(dst_type.to_string());
                return (vt.from_json_value)(json);
            }
        }

        if self.lookup(dst_type).is_none() {
            // destination is the open Unstructured form (or unknown in open mode)
            let json = src.to_json_value()?;
            let Json::Object(map) = json else {
                return Err(SchemeError::TypeMismatch {
                    from: src_type,
                    to: dst_type.clone(),
                });
            };
            let fields = map.into_iter().filter(|(k, _)| k != "type").collect();
            return Ok(Box::new(Unstructured::with_fields(dst_type.clone(), fields)));
        }

        Err(SchemeError::TypeMismatch {
            from: src_type,
            to: dst_type.clone(),
        })
    }
}
