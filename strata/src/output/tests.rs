//! Unit tests for output selection and validation.

use rstest::rstest;
use serde_json::{Value, json};

use super::{select_outputs, validate};
use crate::error::StrataError;

#[test]
fn selection_does_not_descend_into_selected_maps() {
    let tree = json!({
        "outer": {"$output": true, "inner": {"$output": true, "x": 1}},
    });
    assert_eq!(
        select_outputs(tree),
        vec![json!({"inner": {"$output": true, "x": 1}})]
    );
}

#[test]
fn unselected_siblings_are_discarded() {
    let tree = json!({
        "shared": {"image": "web:1"},
        "svc": {"$output": true, "name": "svc"},
        "deploy": {"$output": true, "name": "deploy"},
    });
    assert_eq!(
        select_outputs(tree),
        vec![json!({"name": "deploy"}), json!({"name": "svc"})]
    );
}

#[test]
fn output_false_does_not_select() {
    let tree = json!({"a": {"$output": "maybe"}});
    assert_eq!(select_outputs(tree.clone()), vec![tree]);
}

#[rstest]
#[case(json!({"a": {"$merge": "b"}}), "a.$merge", "$merge")]
#[case(json!({"list": [1, {"$encode": "json"}]}), "list.1.$encode", "$encode")]
#[case(json!({"$parent": "x.yaml"}), "$parent", "$parent")]
#[case(json!({"a": {"$output": true}}), "a.$output", "$output")]
fn leftover_directives_are_rejected(
    #[case] value: Value,
    #[case] path: &str,
    #[case] directive: &str,
) {
    let err = validate(&value).unwrap_err();
    assert!(
        matches!(
            &err,
            StrataError::LeftoverDirective { path: p, directive: d } if p == path && d == directive
        ),
        "unexpected {err:?}"
    );
}

#[rstest]
#[case(json!("$required"), "<root>")]
#[case(json!({"spec": {"ports": [80, "$required"]}}), "spec.ports.1")]
fn required_markers_are_rejected(#[case] value: Value, #[case] path: &str) {
    let err = validate(&value).unwrap_err();
    assert_eq!(err.to_string(), format!("required value missing at {path}"));
}

#[test]
fn plain_data_with_dollar_values_is_valid() {
    let value = json!({"price": "$5", "vars": {"$HOME": "/root"}, "list": ["$required-ish"]});
    assert!(validate(&value).is_ok());
}
