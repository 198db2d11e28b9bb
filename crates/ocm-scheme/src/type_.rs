// SPDX-License-Identifier: Apache-2.0
//! The `(group, name, version)` type triple and its canonical string grammar.

use crate::error::SchemeError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A versioned schema identifier: `group.name/version`.
///
/// `group` may be empty. `version` may be empty ("unversioned") or match
/// `v<n>[alpha<m>|beta<m>]`. Two types are equal iff all three components
/// match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Type {
    group: String,
    name: String,
    version: String,
}

impl Type {
    /// Construct a type, validating `name` and `version` against the grammar.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, SchemeError> {
        let name = name.into();
        let version = version.into();
        if name.is_empty() {
            return Err(SchemeError::InvalidTypeString(format!(
                "name/{version}"
            )));
        }
        if !version.is_empty() && !is_valid_version(&version) {
            return Err(SchemeError::InvalidTypeString(version));
        }
        Ok(Self {
            group: group.into(),
            name,
            version,
        })
    }

    /// Construct an unversioned type with no group, panicking only on the
    /// programmer error of passing an empty name — callers in library code
    /// should prefer [`Type::new`].
    pub fn unversioned(name: impl Into<String>) -> Result<Self, SchemeError> {
        Self::new(String::new(), name, String::new())
    }

    /// The group component (may be empty).
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The name component (never empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version component (empty means unversioned).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// True when this type carries no version.
    pub fn is_unversioned(&self) -> bool {
        self.version.is_empty()
    }

    /// Returns a copy of this type with the version cleared.
    pub fn without_version(&self) -> Self {
        Self {
            group: self.group.clone(),
            name: self.name.clone(),
            version: String::new(),
        }
    }

    /// Returns a copy of this type with a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Result<Self, SchemeError> {
        Self::new(self.group.clone(), self.name.clone(), version)
    }
}

/// `v<digits>` optionally followed by `alpha<digits>` or `beta<digits>`.
fn is_valid_version(version: &str) -> bool {
    let Some(rest) = version.strip_prefix('v') else {
        return false;
    };
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return false;
    }
    let (_major, tail) = rest.split_at(digits_end);
    if tail.is_empty() {
        return true;
    }
    for prefix in ["alpha", "beta"] {
        if let Some(suffix) = tail.strip_prefix(prefix) {
            return !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
        }
    }
    false
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.group.is_empty() {
            write!(f, "{}.", self.group)?;
        }
        f.write_str(&self.name)?;
        if !self.version.is_empty() {
            write!(f, "/{}", self.version)?;
        }
        Ok(())
    }
}

impl FromStr for Type {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, rest) = match s.rsplit_once('.') {
            // Only treat the prefix up to the last '.' before the name as a
            // group when there is no '/' in between (group never contains
            // a version separator).
            Some((g, r)) if !g.is_empty() && !g.contains('/') => (g, r),
            _ => ("", s),
        };
        let (name, version) = match rest.split_once('/') {
            Some((n, v)) => (n, v),
            None => (rest, ""),
        };
        Self::new(group, name, version)
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Type::from_str(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_form() {
        let t = Type::new("ocm.software.oci", "access", "v1").unwrap();
        assert_eq!(t.to_string(), "ocm.software.oci.access/v1");
        let parsed: Type = t.to_string().parse().unwrap();
        assert_eq!(parsed, t);

        let simple = Type::new("ocm", "oci", "v1").unwrap();
        assert_eq!(simple.to_string(), "ocm.oci/v1");
        let reparsed: Type = simple.to_string().parse().unwrap();
        assert_eq!(reparsed, simple);
    }

    #[test]
    fn unversioned_has_no_slash() {
        let t = Type::unversioned("customAccess").unwrap();
        assert_eq!(t.to_string(), "customAccess");
        assert!(t.is_unversioned());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Type::new("", "", "v1").is_err());
    }

    #[test]
    fn accepts_alpha_beta_suffixes() {
        assert!(Type::new("", "a", "v1alpha1").is_ok());
        assert!(Type::new("", "a", "v2beta3").is_ok());
        assert!(Type::new("", "a", "v1gamma1").is_err());
        assert!(Type::new("", "a", "version1").is_err());
    }

    #[test]
    fn equality_requires_all_components() {
        let a = Type::new("g", "n", "v1").unwrap();
        let b = Type::new("g", "n", "v2").unwrap();
        assert_ne!(a, b);
    }
}
