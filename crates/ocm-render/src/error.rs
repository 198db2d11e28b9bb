// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for serialization failures.

use thiserror::Error;

/// Failure modes raised by a [`crate::VertexSerializer`] or
/// [`crate::ListSerializer`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// The underlying format encoder rejected the snapshot.
    #[error("render failed: {0}")]
    Encode(String),
}
