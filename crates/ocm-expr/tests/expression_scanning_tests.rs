// SPDX-License-Identifier: Apache-2.0
//! Scanning strings with more than one expression, and the
//! standalone/template distinction that drives how `ocm-transform`'s
//! resolver substitutes a field's value versus its text.

use ocm_expr::{is_standalone, scan};

#[test]
fn adjacent_expressions_are_each_found_in_order() {
    let found = scan("${a}${b}${c}").unwrap();
    let bodies: Vec<&str> = found.iter().map(|e| e.body.as_str()).collect();
    assert_eq!(bodies, vec!["a", "b", "c"]);
    assert!(!is_standalone("${a}${b}${c}", &found));
}

#[test]
fn a_single_expression_with_surrounding_text_is_not_standalone() {
    let found = scan("https://${host}/v2/").unwrap();
    assert_eq!(found.len(), 1);
    assert!(!is_standalone("https://${host}/v2/", &found));
}

#[test]
fn exactly_one_expression_filling_the_whole_string_is_standalone() {
    let found = scan("${resources.image.access}").unwrap();
    assert!(is_standalone("${resources.image.access}", &found));
}

#[test]
fn nested_field_paths_with_brackets_round_trip_through_the_body() {
    let found = scan(r#"${labels["my.key"][0]}"#).unwrap();
    assert_eq!(found[0].body, r#"labels["my.key"][0]"#);
}
