// SPDX-License-Identifier: Apache-2.0
//! A consumer or resolver identity: a flat mapping of attribute names to
//! values, always carrying at least `type`.

use std::collections::BTreeMap;

/// The attribute name carrying the shell-glob resource path, matched
/// separately from the rest of an identity's attributes.
pub const PATH_ATTRIBUTE: &str = "path";

/// A flat, sorted mapping of identity attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(BTreeMap<String, String>);

impl Identity {
    /// Build an identity from an attribute iterator.
    pub fn new(attributes: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(attributes.into_iter().collect())
    }

    /// The value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of attributes, `path` included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the identity has no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This identity with `path` removed, for separate glob comparison.
    pub fn without_path(&self) -> Self {
        let mut attrs = self.0.clone();
        attrs.remove(PATH_ATTRIBUTE);
        Self(attrs)
    }

    /// Every attribute except `path`.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter(|(k, _)| k.as_str() != PATH_ATTRIBUTE).map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True iff every attribute in `self` (excluding `path`) is present in
    /// `other` with an equal value. `self` is the pattern; `other` is the
    /// candidate being matched against it.
    pub fn is_subset_of(&self, other: &Identity) -> bool {
        self.attributes().all(|(k, v)| other.get(k) == Some(v))
    }

    /// Canonical `k=v,k=v` form, sorted by key, suitable as a cache key.
    pub fn canonical(&self) -> String {
        self.0.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
    }
}

impl FromIterator<(String, String)> for Identity {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_sorted_regardless_of_insertion_order() {
        let a = Identity::new([("type".to_string(), "oci".to_string()), ("hostname".to_string(), "x".to_string())]);
        let b = Identity::new([("hostname".to_string(), "x".to_string()), ("type".to_string(), "oci".to_string())]);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn without_path_drops_only_path() {
        let id = Identity::new([("type".to_string(), "oci".to_string()), ("path".to_string(), "/a/*".to_string())]);
        let stripped = id.without_path();
        assert_eq!(stripped.get("path"), None);
        assert_eq!(stripped.get("type"), Some("oci"));
    }

    #[test]
    fn is_subset_of_requires_every_pattern_attribute_to_match() {
        let pattern = Identity::new([("type".to_string(), "oci".to_string())]);
        let candidate = Identity::new([("type".to_string(), "oci".to_string()), ("hostname".to_string(), "x".to_string())]);
        assert!(pattern.is_subset_of(&candidate));

        let mismatched = Identity::new([("type".to_string(), "npm".to_string())]);
        assert!(!pattern.is_subset_of(&mismatched));
    }
}
