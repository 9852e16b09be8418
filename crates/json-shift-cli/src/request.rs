//! Request and response envelopes.
//!
//! Request shapes, told apart by their fields:
//!
//! ```json
//! {"input": {...}, "spec": [...]}                       // generic transform
//! {"preset": "grade", "data": {...}}                    // named preset
//! {"preset": "grade", "data": {...}, "chart": true}     // preset + chart config
//! {"kind": "bar", "title": "...", "data": {...}}        // chart from shaped data
//! ```
//!
//! The shape is picked by its marker field: `spec`, `preset` or `kind`.
//! A document carrying more than one marker is rejected as ambiguous.
//!
//! Every failure becomes `{"success": false, "error": ..., "kind": ...}`.

use json_shift::{CompileError, ShiftSpec, WalkError};
use json_shift_chart::{presets, synthesize_with, ChartError, ChartKind, ChartOptions};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Chart(ChartRequest),
    Preset(PresetRequest),
    Transform(TransformRequest),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformRequest {
    pub input: Value,
    pub spec: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PresetRequest {
    pub preset: String,
    pub data: Value,
    #[serde(default)]
    pub chart: bool,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartRequest {
    pub kind: String,
    pub data: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, rename = "seriesName")]
    pub series_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(rename = "chartType", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl Response {
    fn output(output: Value) -> Self {
        Self {
            success: true,
            output: Some(output),
            ..Self::default()
        }
    }

    fn failure(error: &RequestError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl RequestError {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Malformed(_) => "MalformedRequest",
            RequestError::Compile(e) => e.kind(),
            RequestError::Walk(e) => e.kind(),
            RequestError::Chart(e) => e.kind(),
        }
    }
}

/// Parse a request document and answer it.
pub fn handle_json(text: &str) -> Response {
    match parse_request(text) {
        Ok(request) => handle(request),
        Err(e) => Response::failure(&e),
    }
}

pub fn parse_request(text: &str) -> Result<Request, RequestError> {
    let doc: Value =
        serde_json::from_str(text).map_err(|e| RequestError::Malformed(e.to_string()))?;
    let object = doc
        .as_object()
        .ok_or_else(|| RequestError::Malformed("request must be a JSON object".to_string()))?;

    let markers: Vec<&str> = ["spec", "preset", "kind"]
        .into_iter()
        .filter(|marker| object.contains_key(*marker))
        .collect();
    match markers.as_slice() {
        ["spec"] => decode(doc, "transform").map(Request::Transform),
        ["preset"] => decode(doc, "preset").map(Request::Preset),
        ["kind"] => decode(doc, "chart").map(Request::Chart),
        [] => Err(RequestError::Malformed(
            "expected {input, spec}, {preset, data} or {kind, data}".to_string(),
        )),
        several => Err(RequestError::Malformed(format!(
            "ambiguous request: fields {} select different request shapes",
            several.join(", ")
        ))),
    }
}

fn decode<T: DeserializeOwned>(doc: Value, shape: &str) -> Result<T, RequestError> {
    serde_json::from_value(doc).map_err(|e| RequestError::Malformed(format!("{shape} request: {e}")))
}

pub fn handle(request: Request) -> Response {
    let result = match request {
        Request::Transform(req) => transform(req),
        Request::Preset(req) => preset(req),
        Request::Chart(req) => chart(req),
    };
    result.unwrap_or_else(|e| {
        warn!(kind = e.kind(), error = %e, "request failed");
        Response::failure(&e)
    })
}

fn transform(req: TransformRequest) -> Result<Response, RequestError> {
    let spec = ShiftSpec::compile(&req.spec)?;
    let output = spec.transform(&req.input)?;
    debug!(operations = spec.operations().len(), "transform request served");
    Ok(Response::output(output))
}

fn preset(req: PresetRequest) -> Result<Response, RequestError> {
    let preset = presets::get(&req.preset)?;
    let mut response = Response {
        success: true,
        preset: Some(preset.name().to_string()),
        chart_type: Some(preset.kind()),
        ..Response::default()
    };
    if req.chart {
        let run = preset.run(&req.data, req.title.as_deref())?;
        response.spec = Some(preset.document().clone());
        response.output = Some(run.output);
        response.config = Some(run.config);
    } else {
        response.output = Some(preset.transform(&req.data)?);
    }
    Ok(response)
}

fn chart(req: ChartRequest) -> Result<Response, RequestError> {
    let kind: ChartKind = req.kind.parse()?;
    let options = ChartOptions {
        title: req.title,
        subtitle: req.subtitle,
        series_name: req.series_name,
    };
    let config = synthesize_with(kind, &req.data, &options)?;
    Ok(Response {
        success: true,
        chart_type: Some(kind),
        config: Some(config),
        ..Response::default()
    })
}

/// Catalog listing: service name, version and the built-in presets.
pub fn info() -> Result<Value, RequestError> {
    let presets: Vec<Value> = presets::all()?
        .iter()
        .map(|preset| {
            serde_json::json!({
                "name": preset.name(),
                "chartType": preset.kind(),
                "title": preset.title(),
                "spec": preset.document(),
            })
        })
        .collect();
    Ok(serde_json::json!({
        "success": true,
        "service": "json-shift",
        "version": env!("CARGO_PKG_VERSION"),
        "presets": presets,
    }))
}

/// Run the built-in sample records through the `grade` preset.
pub fn self_check() -> Result<Value, RequestError> {
    let run = presets::self_check()?;
    let preset = presets::get("grade")?;
    Ok(serde_json::json!({
        "success": true,
        "preset": preset.name(),
        "testInput": presets::sample_records(),
        "testOutput": run.output,
        "config": run.config,
        "spec": preset.document(),
    }))
}
