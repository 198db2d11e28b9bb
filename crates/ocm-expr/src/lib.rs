// SPDX-License-Identifier: Apache-2.0
//! `${...}` expression scanning and schemaless field discovery.

mod error;
mod scan;
mod walk;

pub use error::ExprError;
pub use scan::{is_standalone, scan, Expression};
pub use walk::{walk, FieldDescriptor};
