// SPDX-License-Identifier: Apache-2.0
//! Substituting `${...}` expressions in a step's spec with the outputs of
//! its already-completed upstream steps.

use ocm_expr::{walk, FieldDescriptor};
use serde_json::Value as Json;
use std::collections::HashMap;

/// Replace every expression in `spec` with the value it resolves to against
/// `outputs`, keyed by step id. A standalone field (the whole value is one
/// expression) is replaced with the resolved value verbatim, preserving its
/// type; a template field has each expression's resolved value spliced in
/// as text.
///
/// Expressions that resolve to nothing (an unknown path within an
/// otherwise-known step) are left as dangling text rather than causing an
/// error here; callers that require every reference to resolve should
/// validate at build time via [`crate::builder::build`].
pub fn resolve(spec: &Json, outputs: &HashMap<String, Json>) -> Json {
    let Ok(fields) = walk(spec) else { return spec.clone() };
    let mut resolved = spec.clone();
    for field in &fields {
        if let Some(value) = resolve_field(spec, field, outputs) {
            set_path(&mut resolved, &segments(&field.path), value);
        }
    }
    resolved
}

fn resolve_field(spec: &Json, field: &FieldDescriptor, outputs: &HashMap<String, Json>) -> Option<Json> {
    if field.standalone {
        return resolve_expression(&field.expressions[0], outputs);
    }

    let mut text = get_path(spec, &segments(&field.path))?.as_str()?.to_string();
    for expression in &field.expressions {
        let raw = format!("${{{expression}}}");
        let replacement = resolve_expression(expression, outputs).map(|v| json_as_text(&v)).unwrap_or_else(|| raw.clone());
        text = text.replacen(&raw, &replacement, 1);
    }
    Some(Json::String(text))
}

fn json_as_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve one expression body (`stepId.output.field.path`) against the
/// completed steps' outputs.
fn resolve_expression(body: &str, outputs: &HashMap<String, Json>) -> Option<Json> {
    let mut parts = body.split('.');
    let step_id = parts.next()?;
    let output = outputs.get(step_id)?;
    let mut rest: Vec<&str> = parts.collect();
    if rest.first() == Some(&"output") {
        rest.remove(0);
    }
    get_path(output, &segments(&rest.join(".")))
}

/// One step of a field path: an object key or an array index.
enum Segment {
    Key(String),
    Index(usize),
}

fn get_path(value: &Json, path: &[Segment]) -> Option<Json> {
    let mut current = value.clone();
    for segment in path {
        current = match segment {
            Segment::Key(key) if key.is_empty() => current,
            Segment::Key(key) => current.get(key)?.clone(),
            Segment::Index(index) => current.get(index)?.clone(),
        };
    }
    Some(current)
}

fn set_path(root: &mut Json, path: &[Segment], value: Json) {
    let Some((last, ancestors)) = path.split_last() else { return };
    let mut cursor = root;
    for segment in ancestors {
        let next = match segment {
            Segment::Key(key) => cursor.get_mut(key),
            Segment::Index(index) => cursor.get_mut(index),
        };
        cursor = match next {
            Some(next) => next,
            None => return,
        };
    }
    let slot = match last {
        Segment::Key(key) => cursor.get_mut(key),
        Segment::Index(index) => cursor.get_mut(index),
    };
    if let Some(slot) = slot {
        *slot = value;
    }
}

/// Split a `ocm_expr::walk`-style path (`a.b["c.d"].e`, `a[0]`) into
/// object-key and array-index segments.
fn segments(path: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped.find(']').unwrap_or(stripped.len());
            let token = stripped[..end].trim_matches('"');
            out.push(match token.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                Err(_) => Segment::Key(token.to_string()),
            });
            rest = &stripped[end + 1..];
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            out.push(Segment::Key(rest[..end].to_string()));
            rest = &rest[end..];
        }
        rest = rest.strip_prefix('.').unwrap_or(rest);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standalone_expression_resolves_to_typed_value() {
        let mut outputs = HashMap::new();
        outputs.insert("source".to_string(), json!({"value": 42}));
        let spec = json!({"input": "${source.output.value}"});
        let resolved = resolve(&spec, &outputs);
        assert_eq!(resolved["input"], json!(42));
    }

    #[test]
    fn template_expression_splices_text() {
        let mut outputs = HashMap::new();
        outputs.insert("source".to_string(), json!({"name": "widget"}));
        let spec = json!({"label": "built-${source.output.name}"});
        let resolved = resolve(&spec, &outputs);
        assert_eq!(resolved["label"], json!("built-widget"));
    }

    #[test]
    fn unresolvable_expression_is_left_untouched() {
        let outputs = HashMap::new();
        let spec = json!({"input": "${missing.output.value}"});
        let resolved = resolve(&spec, &outputs);
        assert_eq!(resolved["input"], json!("${missing.output.value}"));
    }

    #[test]
    fn indexed_path_resolves_array_element() {
        let mut outputs = HashMap::new();
        outputs.insert("source".to_string(), json!({"items": ["a", "b"]}));
        let spec = json!({"input": "${source.output.items[1]}"});
        let resolved = resolve(&spec, &outputs);
        assert_eq!(resolved["input"], json!("b"));
    }
}
