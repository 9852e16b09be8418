//! Canonical chart data shapes, validated from reshaped JSON.

use serde_json::{Map, Number, Value};

use crate::error::ChartError;
use crate::kind::ChartKind;

/// One slice of a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub name: String,
    pub value: Number,
}

/// Shape a chart kind consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    /// Index-aligned categories and values (bar, line).
    Axis {
        categories: Vec<String>,
        values: Vec<Number>,
    },
    /// Named values (pie).
    Points(Vec<Point>),
}

impl ChartSeries {
    /// Validate `shaped` against what `kind` expects.
    pub fn from_shaped(kind: ChartKind, shaped: &Value) -> Result<Self, ChartError> {
        if kind.is_axis() {
            let (categories, values) = axis_parts(kind, shaped)?;
            Ok(ChartSeries::Axis {
                categories: labels(kind, "categories", categories)?,
                values: numbers(kind, "values", values)?,
            })
        } else {
            let entries = pie_entries(shaped)?;
            let points = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| point(i, entry))
                .collect::<Result<_, _>>()?;
            Ok(ChartSeries::Points(points))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Axis { categories, .. } => categories.len(),
            ChartSeries::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Back to the canonical JSON shape.
    pub fn to_value(&self) -> Value {
        match self {
            ChartSeries::Axis { categories, values } => {
                let mut map = Map::new();
                map.insert("categories".into(), categories.iter().cloned().map(Value::String).collect());
                map.insert("values".into(), values.iter().cloned().map(Value::Number).collect());
                Value::Object(map)
            }
            ChartSeries::Points(points) => points
                .iter()
                .map(|p| {
                    let mut map = Map::new();
                    map.insert("name".into(), Value::String(p.name.clone()));
                    map.insert("value".into(), Value::Number(p.value.clone()));
                    Value::Object(map)
                })
                .collect(),
        }
    }
}

/// `categories` and `values` of an axis-shaped document, lengths checked.
pub(crate) fn axis_parts(kind: ChartKind, shaped: &Value) -> Result<(&Vec<Value>, &Vec<Value>), ChartError> {
    let object = shaped
        .as_object()
        .ok_or_else(|| ChartError::shape(kind, "expected an object with categories and values"))?;
    let categories = array_field(kind, object, "categories")?;
    let values = array_field(kind, object, "values")?;
    if categories.len() != values.len() {
        return Err(ChartError::shape(
            kind,
            format!(
                "{} categories but {} values",
                categories.len(),
                values.len()
            ),
        ));
    }
    Ok((categories, values))
}

/// The `{name, value}` entries of a pie-shaped document, given directly or
/// under `points`.
pub(crate) fn pie_entries(shaped: &Value) -> Result<&Vec<Value>, ChartError> {
    match shaped {
        Value::Array(entries) => Ok(entries),
        Value::Object(object) => match object.get("points") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(ChartError::shape(
                ChartKind::Pie,
                "expected a list of {name, value} entries",
            )),
        },
        _ => Err(ChartError::shape(
            ChartKind::Pie,
            "expected a list of {name, value} entries",
        )),
    }
}

/// Type-check aligned axis data in place: labels for categories, numbers
/// for values.
pub(crate) fn check_axis(kind: ChartKind, categories: &[Value], values: &[Value]) -> Result<(), ChartError> {
    if let Some(i) = categories.iter().position(|item| !is_label(item)) {
        return Err(ChartError::shape(
            kind,
            format!("categories[{i}] is not a label: {}", categories[i]),
        ));
    }
    if let Some(i) = values.iter().position(|item| !item.is_number()) {
        return Err(ChartError::shape(
            kind,
            format!("values[{i}] is not a number: {}", values[i]),
        ));
    }
    Ok(())
}

/// Type-check pie entries in place.
pub(crate) fn check_points(entries: &[Value]) -> Result<(), ChartError> {
    for (i, entry) in entries.iter().enumerate() {
        point(i, entry)?;
    }
    Ok(())
}

fn array_field<'a>(kind: ChartKind, object: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>, ChartError> {
    match object.get(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ChartError::shape(kind, format!("{field} must be a list"))),
        None => Err(ChartError::shape(kind, format!("missing {field}"))),
    }
}

fn labels(kind: ChartKind, field: &str, items: &[Value]) -> Result<Vec<String>, ChartError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| label(item).ok_or_else(|| ChartError::shape(kind, format!("{field}[{i}] is not a label: {item}"))))
        .collect()
}

fn numbers(kind: ChartKind, field: &str, items: &[Value]) -> Result<Vec<Number>, ChartError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Number(n) => Ok(n.clone()),
            other => Err(ChartError::shape(kind, format!("{field}[{i}] is not a number: {other}"))),
        })
        .collect()
}

fn point(i: usize, entry: &Value) -> Result<Point, ChartError> {
    let object = entry
        .as_object()
        .ok_or_else(|| ChartError::shape(ChartKind::Pie, format!("entry {i} is not an object")))?;
    let name = object
        .get("name")
        .and_then(label)
        .ok_or_else(|| ChartError::shape(ChartKind::Pie, format!("entry {i} has no usable name")))?;
    let value = match object.get("value") {
        Some(Value::Number(n)) => n.clone(),
        _ => {
            return Err(ChartError::shape(
                ChartKind::Pie,
                format!("entry {i} has no numeric value"),
            ))
        }
    };
    Ok(Point { name, value })
}

fn is_label(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Category labels: strings as-is, numbers and booleans as their JSON text.
fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn axis_series_from_shaped() {
        let series = ChartSeries::from_shaped(
            ChartKind::Line,
            &json!({"categories": [12, 13], "values": [4, 6]}),
        )
        .unwrap();
        assert_eq!(
            series.to_value(),
            json!({"categories": ["12", "13"], "values": [4, 6]})
        );
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn axis_shape_errors() {
        for bad in [
            json!({"categories": ["a"]}),
            json!({"values": [1]}),
            json!({"categories": ["a", "b"], "values": [1]}),
            json!({"categories": ["a"], "values": ["1"]}),
            json!({"categories": [null], "values": [1]}),
            json!({"categories": "a", "values": [1]}),
            json!([{"name": "a", "value": 1}]),
        ] {
            let err = ChartSeries::from_shaped(ChartKind::Bar, &bad).unwrap_err();
            assert_eq!(err.kind(), "ShapeMismatch", "{bad}");
        }
    }

    #[test]
    fn pie_points_direct_or_nested() {
        let direct = json!([{"name": "男", "value": 3}, {"name": "女", "value": 5}]);
        let nested = json!({"points": direct.clone()});
        let a = ChartSeries::from_shaped(ChartKind::Pie, &direct).unwrap();
        let b = ChartSeries::from_shaped(ChartKind::Pie, &nested).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_value(), direct);
    }

    #[test]
    fn pie_shape_errors() {
        for bad in [
            json!({"categories": [], "values": []}),
            json!([{"name": "a"}]),
            json!([{"value": 1}]),
            json!([3]),
            json!("x"),
        ] {
            let err = ChartSeries::from_shaped(ChartKind::Pie, &bad).unwrap_err();
            assert_eq!(err.kind(), "ShapeMismatch", "{bad}");
        }
    }
}
