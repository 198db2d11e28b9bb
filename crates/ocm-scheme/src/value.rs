// SPDX-License-Identifier: Apache-2.0
//! Typed values: the `TypedValue` contract plus the two open forms (`Raw`,
//! `Unstructured`) every scheme understands natively.

use crate::error::SchemeError;
use crate::type_::Type;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::any::Any;
use std::collections::BTreeMap;

/// Anything carrying a [`Type`] that can be deep-copied and re-typed.
///
/// Implementors are the "prototypes" registered with a
/// [`crate::scheme::Scheme`]. There is no reflection: a scheme dispatches to
/// a prototype's `(encode, decode, deepcopy)` vtable keyed by [`Type`]
/// (see `crate::scheme::PrototypeVTable`), and `as_any` is the only escape
/// hatch `Convert` needs to downcast a trait object back to its concrete
/// Rust type.
pub trait TypedValue: std::fmt::Debug + Send + Sync {
    /// The type currently carried by this value.
    fn object_type(&self) -> Type;

    /// Overwrite the carried type (used by defaulting/aliasing).
    fn set_object_type(&mut self, ty: Type);

    /// Deep copy. Boxed trait objects can't derive `Clone` directly.
    fn deep_copy(&self) -> Box<dyn TypedValue>;

    /// Escape hatch for `Convert`'s concrete-to-concrete downcast.
    fn as_any(&self) -> &dyn Any;

    /// Serialize to a generic JSON value, for `Convert`'s concrete→Unstructured path.
    fn to_json_value(&self) -> Result<Json, SchemeError>;
}

/// Undecoded payload: `{ type, data }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    object_type: Type,
    /// Opaque, still-encoded payload bytes.
    pub data: Vec<u8>,
}

impl Raw {
    /// Construct a raw value from a type and its undecoded bytes.
    pub fn new(object_type: Type, data: Vec<u8>) -> Self {
        Self { object_type, data }
    }
}

impl TypedValue for Raw {
    fn object_type(&self) -> Type {
        self.object_type.clone()
    }

    fn set_object_type(&mut self, ty: Type) {
        self.object_type = ty;
    }

    fn deep_copy(&self) -> Box<dyn TypedValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_json_value(&self) -> Result<Json, SchemeError> {
        Err(SchemeError::DecodeError(
            "raw values carry undecoded bytes, not JSON".into(),
        ))
    }
}

/// Open, schemaless form: `{ type, fields: map[str -> any] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unstructured {
    #[serde(rename = "type")]
    object_type: Type,
    /// Free-form field map, ordered for deterministic serialization.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Json>,
}

impl Unstructured {
    /// Construct an unstructured value with an empty field map.
    pub fn new(object_type: Type) -> Self {
        Self {
            object_type,
            fields: BTreeMap::new(),
        }
    }

    /// Construct from an already-decoded field map.
    pub fn with_fields(object_type: Type, fields: BTreeMap<String, Json>) -> Self {
        Self { object_type, fields }
    }
}

impl TypedValue for Unstructured {
    fn object_type(&self) -> Type {
        self.object_type.clone()
    }

    fn set_object_type(&mut self, ty: Type) {
        self.object_type = ty;
    }

    fn deep_copy(&self) -> Box<dyn TypedValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_json_value(&self) -> Result<Json, SchemeError> {
        serde_json::to_value(self).map_err(|e| SchemeError::DecodeError(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn raw_carries_type_and_bytes() {
        let ty = Type::unversioned("blob").unwrap();
        let raw = Raw::new(ty.clone(), vec![1, 2, 3]);
        assert_eq!(raw.object_type(), ty);
        assert_eq!(raw.data, vec![1, 2, 3]);
    }

    #[test]
    fn unstructured_round_trips_through_json() {
        let ty = Type::new("ocm", "customAccess", "v1").unwrap();
        let mut u = Unstructured::new(ty.clone());
        u.fields.insert("hostname".into(), Json::String("ghcr.io".into()));
        let encoded = serde_json::to_value(&u).unwrap();
        assert_eq!(encoded["type"], "ocm.customAccess/v1");
        assert_eq!(encoded["hostname"], "ghcr.io");
        let decoded: Unstructured = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.object_type(), ty);
        assert_eq!(decoded.fields.get("hostname").unwrap(), "ghcr.io");
    }
}
