// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for the expression scanner.

use thiserror::Error;

/// Failure modes raised by [`crate::scan::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A `${` appeared inside an already-open expression outside a string
    /// literal, or a string literal opened inside an expression was never
    /// closed before end-of-input.
    #[error("nested or unterminated expression")]
    NestedExpression,
}
