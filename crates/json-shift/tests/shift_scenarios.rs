//! End-to-end shift scenarios: compile a spec document, transform inputs.

use json_shift::{shift, CompileError, ShiftError, ShiftSpec, WalkError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn spec_of(body: Value) -> ShiftSpec {
    ShiftSpec::compile(&json!([{"operation": "shift", "spec": body}]))
        .unwrap_or_else(|e| panic!("compile failed: {e}"))
}

fn run(body: Value, input: Value) -> Value {
    spec_of(body)
        .transform(&input)
        .unwrap_or_else(|e| panic!("transform failed: {e}"))
}

fn students(records: Value) -> Value {
    json!({"Student[]": records})
}

#[test]
fn grade_distribution_to_categories_and_values() {
    let out = run(
        json!({"Student[]": {"*": {"grade": "categories[]", "count": "values[]"}}}),
        students(json!([
            {"grade": "七年级", "count": 3},
            {"grade": "八年级", "count": 2}
        ])),
    );
    assert_eq!(out, json!({"categories": ["七年级", "八年级"], "values": [3, 2]}));
}

#[test]
fn gender_distribution_to_name_value_pairs() {
    let out = run(
        json!({"Student[]": {"*": {"gender": "[&1].name", "count": "[&1].value"}}}),
        students(json!([{"gender": "男", "count": 3}])),
    );
    assert_eq!(out, json!([{"name": "男", "value": 3}]));

    let out = run(
        json!({"Student[]": {"*": {"gender": "[&1].name", "count": "[&1].value"}}}),
        students(json!([
            {"gender": "男", "count": 3},
            {"gender": "女", "count": 5}
        ])),
    );
    assert_eq!(
        out,
        json!([{"name": "男", "value": 3}, {"name": "女", "value": 5}])
    );
}

#[test]
fn escaped_entity_key_matches_the_same_input() {
    let bare = json!({"Student[]": {"*": {"age": "categories[]", "count": "values[]"}}});
    let escaped = json!({"Student\\[\\]": {"*": {"age": "categories[]", "count": "values[]"}}});
    let input = students(json!([{"age": 12, "count": 4}, {"age": 13, "count": 6}]));
    let expected = json!({"categories": [12, 13], "values": [4, 6]});
    assert_eq!(run(bare, input.clone()), expected);
    assert_eq!(run(escaped, input), expected);
}

#[test]
fn capture_reference_past_the_stack_fails() {
    let spec = spec_of(json!({"Student[]": {"*": {"count": "[&3].value"}}}));
    let err = spec
        .transform(&students(json!([{"count": 1}])))
        .unwrap_err();
    assert_eq!(
        err,
        WalkError::CaptureReferenceOutOfRange {
            template: "[&3].value".into(),
            reference: 3,
            available: 1,
        }
    );
}

#[test]
fn capture_reference_error_does_not_leak_partial_output() {
    let err = shift(
        &json!([{"operation": "shift", "spec": {"*": {"ok": "good[]", "bad": "x.&2"}}}]),
        &json!({"row": {"ok": 1, "bad": 2}}),
    )
    .unwrap_err();
    assert!(matches!(err, ShiftError::Walk(WalkError::CaptureReferenceOutOfRange { .. })));
}

#[test]
fn malformed_templates_fail_before_data() {
    let err = ShiftSpec::compile(&json!([
        {"operation": "shift", "spec": {"a": "values[", "b": "ok"}}
    ]))
    .unwrap_err();
    assert!(matches!(err, CompileError::MalformedOutputTemplate { .. }));
}

#[test]
fn unmatched_keys_are_dropped() {
    let out = run(
        json!({"Student[]": {"*": {"grade": "categories[]"}}}),
        json!({
            "Student[]": [{"grade": "七年级", "name": "张三", "id": 7}],
            "Parent[]": [{"name": "x"}],
            "total": 1
        }),
    );
    assert_eq!(out, json!({"categories": ["七年级"]}));
}

#[test]
fn literal_and_wildcard_siblings_broadcast() {
    let out = run(
        json!({"scores": {"math": "highlight.math", "*": "all.&1"}}),
        json!({"scores": {"math": 90, "art": 80}}),
    );
    assert_eq!(
        out,
        json!({"highlight": {"math": 90}, "all": {"math": 90, "art": 80}})
    );
}

#[test]
fn glob_groups_build_keys() {
    let out = run(
        json!({"rating-*": "ratings.&(1,1)", "*-count": "counts.&(1,1)"}),
        json!({"rating-quality": 4, "rating-price": 2, "student-count": 9, "other": 0}),
    );
    assert_eq!(
        out,
        json!({"ratings": {"quality": 4, "price": 2}, "counts": {"student": 9}})
    );
}

#[test]
fn alternation_selects_several_fields() {
    let out = run(
        json!({"rows": {"*": {"grade|age": "labels[]"}}}),
        json!({"rows": [{"grade": "七年级", "age": 13, "name": "x"}]}),
    );
    assert_eq!(out, json!({"labels": ["七年级", 13]}));
}

#[test]
fn virtual_leaves() {
    let out = run(
        json!({
            "counts": {
                "*": {"$": "categories[]", "@": "values[]"},
            },
            "#bar": "chart.kind"
        }),
        json!({"counts": {"七年级": 3, "八年级": 2}}),
    );
    assert_eq!(
        out,
        json!({
            "categories": ["七年级", "八年级"],
            "values": [3, 2],
            "chart": {"kind": "bar"}
        })
    );
}

#[test]
fn one_value_many_outputs() {
    let out = run(
        json!({"id": ["ids[]", "meta.first"]}),
        json!({"id": 42}),
    );
    assert_eq!(out, json!({"ids": [42], "meta": {"first": 42}}));
}

#[test]
fn nested_captures_walk_back_up() {
    let out = run(
        json!({"*": {"*": {"count": "&2.&1"}}}),
        json!({
            "七年级": {"男": {"count": 1}, "女": {"count": 2}},
            "八年级": {"男": {"count": 3}}
        }),
    );
    assert_eq!(
        out,
        json!({"七年级": {"男": 1, "女": 2}, "八年级": {"男": 3}})
    );
}

#[test]
fn explicit_array_index_in_spec() {
    let out = run(
        json!({"Student[]": {"0": {"grade": "first"}}}),
        students(json!([{"grade": "七年级"}, {"grade": "八年级"}])),
    );
    assert_eq!(out, json!({"first": "七年级"}));
}

#[test]
fn nothing_matched_is_empty_object() {
    let out = run(json!({"missing": "x"}), json!({"present": 1}));
    assert_eq!(out, json!({}));
    let out = run(json!({"a": {"b": "x"}}), json!([1, 2]));
    assert_eq!(out, json!({}));
}

#[test]
fn repeated_transforms_are_byte_identical() {
    let spec = spec_of(json!({"Student[]": {"*": {"grade": "categories[]", "count": "values[]"}}}));
    let input = students(json!([
        {"grade": "九年级", "count": 1},
        {"grade": "七年级", "count": 3},
        {"grade": "八年级", "count": 2}
    ]));
    let first = serde_json::to_string(&spec.transform(&input).unwrap()).unwrap();
    for _ in 0..10 {
        let again = serde_json::to_string(&spec.transform(&input).unwrap()).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn compiled_spec_shared_across_threads() {
    let spec = Arc::new(spec_of(
        json!({"Student[]": {"*": {"grade": "categories[]", "count": "values[]"}}}),
    ));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let spec = Arc::clone(&spec);
            std::thread::spawn(move || {
                let input = students(json!([{"grade": format!("g{n}"), "count": n}]));
                spec.transform(&input).unwrap()
            })
        })
        .collect();
    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            json!({"categories": [format!("g{n}")], "values": [n]})
        );
    }
}

#[test]
fn oversized_captured_index_is_an_error() {
    let spec = spec_of(json!({"*": "[&1]"}));
    for key in ["18446744073709551615", "99999999999"] {
        let mut input = serde_json::Map::new();
        input.insert(key.to_string(), json!(1));
        let err = spec.transform(&Value::Object(input)).unwrap_err();
        assert_eq!(err.kind(), "IndexOutOfRange", "{key}");
    }
    assert_eq!(
        spec.transform(&json!({"2": "c"})).unwrap(),
        json!([null, null, "c"])
    );
}

#[test]
fn oversized_literal_index_fails_to_compile() {
    let err = ShiftSpec::compile(&json!([
        {"operation": "shift", "spec": {"a": "rows[18446744073709551615]"}}
    ]))
    .unwrap_err();
    assert!(matches!(err, CompileError::MalformedOutputTemplate { .. }));
}

#[test]
fn wrong_typed_containers_are_replaced() {
    let spec = spec_of(json!({"list": "a[]", "obj": "a.b"}));
    assert_eq!(
        spec.transform(&json!({"list": 1, "obj": 2})).unwrap(),
        json!({"a": {"b": 2}})
    );
    assert_eq!(
        spec.transform(&json!({"obj": 2, "list": 1})).unwrap(),
        json!({"a": [1]})
    );
}

#[test]
fn append_under_captured_index() {
    let out = run(
        json!({"*": {"*": "[&2][]"}}),
        json!([[1, 2], [3]]),
    );
    assert_eq!(out, json!([[1, 2], [3]]));

    let out = run(
        json!({"Student[]": {"*": {"tags": {"*": "[&2][]"}}}}),
        students(json!([{"tags": ["a", "b"]}, {"tags": []}, {"tags": ["c"]}])),
    );
    assert_eq!(out, json!([["a", "b"], null, ["c"]]));
}
