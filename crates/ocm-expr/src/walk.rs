// SPDX-License-Identifier: Apache-2.0
//! Depth-first walk over a schemaless JSON tree, collecting one
//! [`FieldDescriptor`] per string leaf that carries at least one expression.

use crate::error::ExprError;
use crate::scan::{is_standalone, scan};
use serde_json::Value as Json;

/// One expression-bearing string field found while walking a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Dotted/bracketed path to the field from the document root.
    pub path: String,
    /// The body of every expression found in the field, in order.
    pub expressions: Vec<String>,
    /// True when the field's entire value is exactly one expression.
    pub standalone: bool,
    /// `None` for a standalone expression (the caller fills this in from a
    /// schema); `Some("string")` for a string template.
    pub expected_type: Option<String>,
}

/// Walk `value` depth-first and collect a descriptor for every
/// expression-bearing string leaf.
pub fn walk(value: &Json) -> Result<Vec<FieldDescriptor>, ExprError> {
    let mut out = Vec::new();
    walk_into(value, String::new(), &mut out)?;
    Ok(out)
}

fn walk_into(value: &Json, path: String, out: &mut Vec<FieldDescriptor>) -> Result<(), ExprError> {
    match value {
        Json::Object(map) => {
            for (key, child) in map {
                walk_into(child, append_key(&path, key), out)?;
            }
        }
        Json::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk_into(child, format!("{path}[{index}]"), out)?;
            }
        }
        Json::String(s) => {
            let expressions = scan(s)?;
            if !expressions.is_empty() {
                let standalone = is_standalone(s, &expressions);
                out.push(FieldDescriptor {
                    path,
                    expressions: expressions.into_iter().map(|e| e.body).collect(),
                    standalone,
                    expected_type: if standalone { None } else { Some("string".to_string()) },
                });
            }
        }
        Json::Null | Json::Bool(_) | Json::Number(_) => {}
    }
    Ok(())
}

/// Appends a mapping key to a path: `.k` when `k` is a bare identifier,
/// `["k"]` when it contains `.`, `[` or `]`.
fn append_key(path: &str, key: &str) -> String {
    if key.contains(['.', '[', ']']) {
        format!("{path}[\"{key}\"]")
    } else if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_nested_standalone_and_template_fields() {
        let doc = json!({
            "name": "${component.name}",
            "tags": ["plain", "prefix-${x}"],
            "nested": { "weird.key": "${y}" },
        });
        let fields = walk(&doc).unwrap();
        let by_path: std::collections::BTreeMap<_, _> =
            fields.iter().map(|f| (f.path.clone(), f)).collect();

        let name = by_path.get("name").unwrap();
        assert!(name.standalone);
        assert_eq!(name.expected_type, None);

        let tag = by_path.get("tags[1]").unwrap();
        assert!(!tag.standalone);
        assert_eq!(tag.expected_type.as_deref(), Some("string"));

        let nested = by_path.get(r#"nested["weird.key"]"#).unwrap();
        assert_eq!(nested.expressions, vec!["y".to_string()]);
    }

    #[test]
    fn document_with_no_expressions_returns_empty() {
        let doc = json!({"a": "b", "c": [1, 2, 3]});
        assert!(walk(&doc).unwrap().is_empty());
    }

    #[test]
    fn propagates_scan_errors() {
        let doc = json!({"bad": "${ ${nested} }"});
        assert!(walk(&doc).is_err());
    }
}
