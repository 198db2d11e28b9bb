// SPDX-License-Identifier: Apache-2.0
//! A registered consumer pattern and the resolver that produces credentials
//! for identities matching it.

use crate::error::CredentialError;
use crate::identity::Identity;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Produces a credentials mapping for an identity that matched its
/// registered pattern.
pub type CredentialResolver =
    Arc<dyn Fn(&Identity) -> Pin<Box<dyn Future<Output = Result<HashMap<String, String>, CredentialError>> + Send>> + Send + Sync>;

/// One consumer registration: the pattern it matches against and the
/// resolver that serves it.
pub struct ConsumerEntry {
    pub(crate) pattern: Identity,
    pub(crate) resolver: CredentialResolver,
}

impl ConsumerEntry {
    /// Pair a pattern with the resolver that serves identities matching it.
    pub fn new(pattern: Identity, resolver: CredentialResolver) -> Self {
        Self { pattern, resolver }
    }
}

/// Wrap a resolver that returns credentials without ever failing.
pub fn static_resolver(credentials: HashMap<String, String>) -> CredentialResolver {
    Arc::new(move |_identity| {
        let credentials = credentials.clone();
        Box::pin(async move { Ok(credentials) })
    })
}
