//! Built-in specs for the student distribution charts.
//!
//! The catalog is compiled on first use and read-only afterwards.

use std::sync::OnceLock;

use json_shift::{CompileError, ShiftSpec};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ChartError;
use crate::kind::ChartKind;
use crate::synth::{synthesize_with, ChartOptions};

/// A named spec paired with the chart it feeds.
#[derive(Debug)]
pub struct Preset {
    name: &'static str,
    kind: ChartKind,
    title: &'static str,
    document: Value,
    spec: ShiftSpec,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Default chart title.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// The spec document this preset was compiled from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn spec(&self) -> &ShiftSpec {
        &self.spec
    }

    /// Reshape flattened records into this preset's chart data.
    pub fn transform(&self, input: &Value) -> Result<Value, ChartError> {
        Ok(self.spec.transform(input)?)
    }

    /// Reshape and synthesize in one go. `title` defaults to [`Preset::title`].
    pub fn chart(&self, input: &Value, title: Option<&str>) -> Result<Value, ChartError> {
        Ok(self.run(input, title)?.config)
    }

    /// Like [`Preset::chart`], keeping the reshaped data alongside the config.
    pub fn run(&self, input: &Value, title: Option<&str>) -> Result<PresetRun, ChartError> {
        let output = self.transform(input)?;
        let options = ChartOptions::titled(title.unwrap_or(self.title));
        let config = synthesize_with(self.kind, &output, &options)?;
        Ok(PresetRun { output, config })
    }
}

/// Every stage of a preset run: the reshaped data and the chart config
/// built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRun {
    pub output: Value,
    pub config: Value,
}

fn axis_spec(entity: &str, category_field: &str) -> Value {
    json!([{
        "operation": "shift",
        "spec": {
            entity: {
                "*": {category_field: "categories[]", "count": "values[]"}
            }
        }
    }])
}

fn pie_spec(entity: &str, name_field: &str) -> Value {
    json!([{
        "operation": "shift",
        "spec": {
            entity: {
                "*": {name_field: "[&1].name", "count": "[&1].value"}
            }
        }
    }])
}

fn compile_catalog() -> Result<Vec<Preset>, CompileError> {
    let definitions = [
        ("grade", ChartKind::Bar, "学生年级分布", axis_spec("Student[]", "grade")),
        ("gender", ChartKind::Pie, "学生性别分布", pie_spec("Student[]", "gender")),
        ("age", ChartKind::Line, "学生年龄分布", axis_spec("Student[]", "age")),
    ];
    let presets = definitions
        .into_iter()
        .map(|(name, kind, title, document)| -> Result<Preset, CompileError> {
            let spec = ShiftSpec::compile(&document)?;
            Ok(Preset {
                name,
                kind,
                title,
                document,
                spec,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;
    debug!(count = presets.len(), "compiled preset catalog");
    Ok(presets)
}

fn catalog() -> Result<&'static [Preset], ChartError> {
    static CATALOG: OnceLock<Result<Vec<Preset>, CompileError>> = OnceLock::new();
    CATALOG
        .get_or_init(compile_catalog)
        .as_deref()
        .map_err(|e| ChartError::Shift(e.clone().into()))
}

/// Every preset, in catalog order.
pub fn all() -> Result<&'static [Preset], ChartError> {
    catalog()
}

pub fn names() -> Result<Vec<&'static str>, ChartError> {
    Ok(catalog()?.iter().map(Preset::name).collect())
}

pub fn get(name: &str) -> Result<&'static Preset, ChartError> {
    catalog()?
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| ChartError::UnknownPreset(name.to_string()))
}

/// Flattened student records used to smoke-test the `grade` preset.
pub fn sample_records() -> Value {
    json!({"Student[]": [
        {"grade": "七年级", "count": 3},
        {"grade": "八年级", "count": 2}
    ]})
}

/// Runs [`sample_records`] through the `grade` preset and checks the result.
pub fn self_check() -> Result<PresetRun, ChartError> {
    let run = get("grade")?.run(&sample_records(), None)?;
    let expected = json!({"categories": ["七年级", "八年级"], "values": [3, 2]});
    if run.output != expected {
        return Err(ChartError::shape(
            ChartKind::Bar,
            format!("self-check produced {}, expected {expected}", run.output),
        ));
    }
    Ok(run)
}
