// SPDX-License-Identifier: Apache-2.0
//! The default matcher: `IdentityMatchesPath ∧ IdentityEqual`, scored by
//! specificity so the most constrained registered pattern wins.

use crate::error::CredentialError;
use crate::identity::{Identity, PATH_ATTRIBUTE};
use globset::GlobBuilder;

/// How closely `pattern` matches `candidate`: `None` when it does not match
/// at all, `Some(score)` otherwise, where a higher score is more specific.
pub fn match_score(pattern: &Identity, candidate: &Identity) -> Result<Option<usize>, CredentialError> {
    if !pattern.without_path().is_subset_of(&candidate.without_path()) {
        return Ok(None);
    }

    let mut score = pattern.without_path().len();
    if let Some(glob_pattern) = pattern.get(PATH_ATTRIBUTE) {
        let glob = GlobBuilder::new(glob_pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| CredentialError::InvalidPathPattern { pattern: glob_pattern.to_string(), reason: e.to_string() })?
            .compile_matcher();
        let Some(path) = candidate.get(PATH_ATTRIBUTE) else { return Ok(None) };
        if !glob.is_match(path) {
            return Ok(None);
        }
        score += 1;
    }

    Ok(Some(score))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn identity(pairs: &[(&str, &str)]) -> Identity {
        Identity::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn exact_attribute_mismatch_does_not_match() {
        let pattern = identity(&[("type", "oci")]);
        let candidate = identity(&[("type", "npm")]);
        assert_eq!(match_score(&pattern, &candidate).unwrap(), None);
    }

    #[test]
    fn path_glob_matches_with_double_star() {
        let pattern = identity(&[("type", "oci"), ("path", "registry.example.com/**")]);
        let candidate = identity(&[("type", "oci"), ("path", "registry.example.com/a/b")]);
        assert_eq!(match_score(&pattern, &candidate).unwrap(), Some(2));
    }

    #[test]
    fn path_glob_mismatch_fails_even_if_attributes_match() {
        let pattern = identity(&[("type", "oci"), ("path", "other.example.com/**")]);
        let candidate = identity(&[("type", "oci"), ("path", "registry.example.com/a")]);
        assert_eq!(match_score(&pattern, &candidate).unwrap(), None);
    }

    #[test]
    fn single_star_does_not_cross_path_segment() {
        let pattern = identity(&[("type", "oci"), ("path", "registry.example.com/*")]);
        let candidate = identity(&[("type", "oci"), ("path", "registry.example.com/a/b")]);
        assert_eq!(match_score(&pattern, &candidate).unwrap(), None);

        let shallow_candidate = identity(&[("type", "oci"), ("path", "registry.example.com/a")]);
        assert_eq!(match_score(&pattern, &shallow_candidate).unwrap(), Some(2));
    }

    #[test]
    fn more_specific_pattern_scores_higher() {
        let broad = identity(&[("type", "oci")]);
        let narrow = identity(&[("type", "oci"), ("hostname", "registry.example.com")]);
        let candidate = identity(&[("type", "oci"), ("hostname", "registry.example.com")]);
        assert!(match_score(&narrow, &candidate).unwrap() > match_score(&broad, &candidate).unwrap());
    }
}
