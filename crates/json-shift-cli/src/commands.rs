//! Command logic behind the `json-shift` binary.
//!
//! Each function takes JSON text and returns the document to print, so the
//! binary only deals with argument parsing and I/O.

use json_shift::{CompileError, ShiftError, ShiftSpec, WalkError};
use json_shift_chart::{presets, synthesize_with, ChartError, ChartKind, ChartOptions};
use serde_json::Value;
use thiserror::Error;

use crate::request::{handle_json, info, self_check, RequestError, Response};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid JSON in {source_name}: {error}")]
    Json {
        source_name: &'static str,
        #[source]
        error: serde_json::Error,
    },

    #[error(transparent)]
    Shift(#[from] ShiftError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        CliError::Shift(e.into())
    }
}

impl From<WalkError> for CliError {
    fn from(e: WalkError) -> Self {
        CliError::Shift(e.into())
    }
}

fn parse(text: &str, source_name: &'static str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(|error| CliError::Json { source_name, error })
}

/// Run a spec document against an input document.
pub fn transform(spec_json: &str, input_json: &str) -> Result<Value, CliError> {
    let spec = ShiftSpec::compile(&parse(spec_json, "spec")?)?;
    Ok(spec.transform(&parse(input_json, "input")?)?)
}

/// What `preset` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetView {
    /// The reshaped data.
    Output,
    /// The chart config.
    Chart,
    /// Spec, reshaped data and chart config together.
    Explain,
}

/// Run a named preset.
pub fn preset(
    name: &str,
    input_json: &str,
    view: PresetView,
    title: Option<&str>,
) -> Result<Value, CliError> {
    let preset = presets::get(name)?;
    let input = parse(input_json, "input")?;
    match view {
        PresetView::Output => Ok(preset.transform(&input)?),
        PresetView::Chart => Ok(preset.chart(&input, title)?),
        PresetView::Explain => {
            let run = preset.run(&input, title)?;
            Ok(serde_json::json!({
                "preset": preset.name(),
                "chartType": preset.kind(),
                "spec": preset.document(),
                "output": run.output,
                "config": run.config,
            }))
        }
    }
}

/// Synthesize a chart config from already shaped data.
pub fn chart(kind: &str, shaped_json: &str, options: &ChartOptions) -> Result<Value, CliError> {
    let kind: ChartKind = kind.parse()?;
    Ok(synthesize_with(kind, &parse(shaped_json, "data")?, options)?)
}

/// Answer a request envelope. Failures are part of the envelope.
pub fn request(request_json: &str) -> Response {
    handle_json(request_json)
}

pub fn presets() -> Result<Value, CliError> {
    Ok(info()?)
}

/// Run the built-in sample through the `grade` preset.
pub fn check() -> Result<Value, CliError> {
    Ok(self_check()?)
}

/// Serialize for output, pretty-printed on request.
pub fn render(value: &impl serde::Serialize, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
