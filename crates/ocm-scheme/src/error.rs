// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for the typed object runtime.

use crate::type_::Type;
use thiserror::Error;

/// Failure modes raised by [`crate::scheme::Scheme`] and its collaborators.
#[derive(Debug, Error)]
pub enum SchemeError {
    /// No prototype is registered for the given type.
    #[error("unknown type: {0}")]
    UnknownType(Type),
    /// A prototype is already bound to one of the requested types.
    #[error("type already registered: {0}")]
    AlreadyRegistered(Type),
    /// `Convert` was asked to bridge two incompatible typed values.
    #[error("cannot convert {from} into {to}")]
    TypeMismatch {
        /// Source type.
        from: Type,
        /// Destination type.
        to: Type,
    },
    /// JSON/YAML decoding failed.
    #[error("decode error: {0}")]
    DecodeError(String),
    /// A document required a `type` field but none was present.
    #[error("missing required `type` field")]
    MissingType,
    /// The type string did not match the Type grammar.
    #[error("invalid type string: {0:?}")]
    InvalidTypeString(String),
}
