// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for credential resolution.

use thiserror::Error;

/// Failure modes raised by [`crate::graph::CredentialGraph`].
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No registered consumer matched the requested identity.
    #[error("no credential resolver matches identity {identity}")]
    NotFound {
        /// The canonical form of the identity that failed to match.
        identity: String,
    },
    /// The `path` attribute's glob pattern failed to compile.
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPathPattern {
        /// The offending pattern.
        pattern: String,
        /// Why `globset` rejected it.
        reason: String,
    },
    /// A resolver failed to produce credentials for a matched identity.
    #[error("resolver failed for identity {identity}: {reason}")]
    ResolverFailed {
        /// The canonical form of the identity being resolved.
        identity: String,
        /// The resolver's failure text.
        reason: String,
    },
}
