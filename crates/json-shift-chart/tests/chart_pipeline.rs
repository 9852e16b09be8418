//! Records → preset shift → chart config, plus synthesizer properties.

use json_shift_chart::{presets, synthesize, ChartError, ChartKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn students(records: Value) -> Value {
    json!({"Student[]": records})
}

#[test]
fn grade_preset_end_to_end() {
    let records = students(json!([
        {"grade": "七年级", "count": 3},
        {"grade": "八年级", "count": 2},
        {"grade": "九年级", "count": 4}
    ]));
    let preset = presets::get("grade").unwrap();
    assert_eq!(
        preset.transform(&records).unwrap(),
        json!({"categories": ["七年级", "八年级", "九年级"], "values": [3, 2, 4]})
    );
    assert_eq!(
        preset.chart(&records, None).unwrap(),
        json!({
            "title": {"text": "学生年级分布"},
            "tooltip": {},
            "xAxis": {"type": "category", "data": ["七年级", "八年级", "九年级"]},
            "yAxis": {"type": "value"},
            "series": [{"type": "bar", "data": [3, 2, 4]}]
        })
    );
}

#[test]
fn gender_preset_end_to_end() {
    let records = students(json!([
        {"gender": "男", "count": 6},
        {"gender": "女", "count": 5}
    ]));
    let preset = presets::get("gender").unwrap();
    let config = preset.chart(&records, Some("性别")).unwrap();
    assert_eq!(
        config,
        json!({
            "title": {"text": "性别", "left": "center"},
            "tooltip": {"trigger": "item"},
            "series": [{
                "type": "pie",
                "radius": "50%",
                "data": [{"name": "男", "value": 6}, {"name": "女", "value": 5}]
            }]
        })
    );
}

#[test]
fn age_preset_end_to_end() {
    let records = students(json!([
        {"age": 12, "count": 2},
        {"age": 13, "count": 5},
        {"age": 14, "count": 1}
    ]));
    let config = presets::get("age").unwrap().chart(&records, None).unwrap();
    assert_eq!(config["title"]["text"], json!("学生年龄分布"));
    assert_eq!(config["xAxis"]["data"], json!([12, 13, 14]));
    assert_eq!(config["series"][0], json!({"type": "line", "data": [2, 5, 1]}));
}

#[test]
fn wrong_records_surface_shape_mismatch() {
    // gender records through the grade preset leave no categories at all.
    let records = students(json!([{"gender": "男", "count": 6}]));
    let err = presets::get("grade").unwrap().chart(&records, None).unwrap_err();
    assert!(matches!(err, ChartError::ShapeMismatch { kind: ChartKind::Bar, .. }));
}

#[test]
fn bar_data_into_pie_is_rejected() {
    let err = synthesize(
        ChartKind::Pie,
        &json!({"categories": ["a"], "values": [1]}),
        "t",
    )
    .unwrap_err();
    assert_eq!(err.kind(), "ShapeMismatch");
}

proptest! {
    #[test]
    fn axis_configs_round_trip(pairs in prop::collection::vec(("[a-z七八九年级]{1,5}", -1000i64..1000), 0..20)) {
        let categories: Vec<Value> = pairs.iter().map(|(c, _)| json!(c)).collect();
        let values: Vec<Value> = pairs.iter().map(|(_, v)| json!(v)).collect();
        let shaped = json!({"categories": categories, "values": values});
        for kind in [ChartKind::Bar, ChartKind::Line] {
            let config = synthesize(kind, &shaped, "t").unwrap();
            prop_assert_eq!(&config["xAxis"]["data"], &json!(categories));
            prop_assert_eq!(&config["series"][0]["data"], &json!(values));
        }
    }
}
