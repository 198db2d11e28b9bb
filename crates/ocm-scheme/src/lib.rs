// SPDX-License-Identifier: Apache-2.0
//! Typed object runtime.
//!
//! A [`Scheme`] is a `Type ⇄ prototype` registry that decodes, defaults and
//! converts typed documents without runtime reflection: every prototype is
//! registered with a monomorphized `fn`-pointer vtable, the same dispatch
//! shape `rmg-core::rule::RewriteRule` uses for its rewrite rules.

mod error;
mod scheme;
mod type_;
mod value;

pub use error::SchemeError;
pub use scheme::{Format, Mode, Scheme};
pub use type_::Type;
pub use value::{Raw, TypedValue, Unstructured};
