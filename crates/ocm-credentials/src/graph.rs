// SPDX-License-Identifier: Apache-2.0
//! The registry of consumer patterns and resolvers, with most-specific-
//! match-wins resolution and a clone-on-return result cache.

use crate::error::CredentialError;
use crate::identity::Identity;
use crate::matcher::match_score;
use crate::resolver::{ConsumerEntry, CredentialResolver};
use std::collections::HashMap;
use std::sync::RwLock;

fn poisoned<T>(lock: std::sync::LockResult<T>) -> T {
    lock.unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Consumers and resolvers, walked in registration order to find the most
/// specific match for a requested identity.
pub struct CredentialGraph {
    consumers: RwLock<Vec<ConsumerEntry>>,
    cache: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl Default for CredentialGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self { consumers: RwLock::new(Vec::new()), cache: RwLock::new(HashMap::new()) }
    }

    /// Register a consumer pattern and its resolver. Later registrations
    /// with equal specificity lose ties to earlier ones.
    pub fn register(&self, pattern: Identity, resolver: CredentialResolver) {
        poisoned(self.consumers.write()).push(ConsumerEntry::new(pattern, resolver));
    }

    /// Resolve `identity` to a credentials mapping, consulting the cache
    /// first and populating it with a clone of the result on a miss.
    pub async fn resolve(&self, identity: &Identity) -> Result<HashMap<String, String>, CredentialError> {
        let key = identity.canonical();
        if let Some(cached) = poisoned(self.cache.read()).get(&key) {
            return Ok(cached.clone());
        }

        let resolver = self.best_match(identity)?;
        let credentials = resolver(identity)
            .await
            .map_err(|e| CredentialError::ResolverFailed { identity: key.clone(), reason: e.to_string() })?;

        poisoned(self.cache.write()).insert(key, credentials.clone());
        Ok(credentials)
    }

    fn best_match(&self, identity: &Identity) -> Result<CredentialResolver, CredentialError> {
        let consumers = poisoned(self.consumers.read());
        let mut best: Option<(usize, usize)> = None;
        for (index, entry) in consumers.iter().enumerate() {
            if let Some(score) = match_score(&entry.pattern, identity)? {
                if best.is_none_or(|(best_score, _)| score > best_score) {
                    best = Some((score, index));
                }
            }
        }
        match best {
            Some((_, index)) => Ok(consumers[index].resolver.clone()),
            None => Err(CredentialError::NotFound { identity: identity.canonical() }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::resolver::static_resolver;

    fn identity(pairs: &[(&str, &str)]) -> Identity {
        Identity::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    fn creds(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn most_specific_pattern_wins() {
        let graph = CredentialGraph::new();
        graph.register(identity(&[("type", "oci")]), static_resolver(creds(&[("token", "broad")])));
        graph.register(
            identity(&[("type", "oci"), ("hostname", "registry.example.com")]),
            static_resolver(creds(&[("token", "narrow")])),
        );

        let result = graph.resolve(&identity(&[("type", "oci"), ("hostname", "registry.example.com")])).await.unwrap();
        assert_eq!(result.get("token"), Some(&"narrow".to_string()));
    }

    #[tokio::test]
    async fn tie_is_broken_by_registration_order() {
        let graph = CredentialGraph::new();
        graph.register(identity(&[("type", "oci")]), static_resolver(creds(&[("token", "first")])));
        graph.register(identity(&[("type", "oci")]), static_resolver(creds(&[("token", "second")])));

        let result = graph.resolve(&identity(&[("type", "oci")])).await.unwrap();
        assert_eq!(result.get("token"), Some(&"first".to_string()));
    }

    #[tokio::test]
    async fn unmatched_identity_returns_not_found() {
        let graph = CredentialGraph::new();
        graph.register(identity(&[("type", "oci")]), static_resolver(creds(&[])));
        let err = graph.resolve(&identity(&[("type", "npm")])).await.unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { .. }));
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let graph = CredentialGraph::new();
        graph.register(identity(&[("type", "oci")]), static_resolver(creds(&[("token", "a")])));
        let id = identity(&[("type", "oci")]);
        let first = graph.resolve(&id).await.unwrap();
        let second = graph.resolve(&id).await.unwrap();
        assert_eq!(first, second);
    }
}
