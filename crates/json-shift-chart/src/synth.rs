//! Renderer config synthesis (ECharts option layout).

use serde_json::{json, Value};
use tracing::debug;

use crate::error::ChartError;
use crate::kind::ChartKind;
use crate::series::{axis_parts, check_axis, check_points, pie_entries};

/// Optional decorations on top of the bare config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartOptions {
    pub title: String,
    pub subtitle: Option<String>,
    pub series_name: Option<String>,
}

impl ChartOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Build a renderer config for `kind` from already reshaped data.
///
/// Bar and line charts take `{categories, values}`; pie charts take a list
/// of `{name, value}` entries, copied into the config as given.
pub fn synthesize(kind: ChartKind, shaped: &Value, title: &str) -> Result<Value, ChartError> {
    synthesize_with(kind, shaped, &ChartOptions::titled(title))
}

pub fn synthesize_with(kind: ChartKind, shaped: &Value, options: &ChartOptions) -> Result<Value, ChartError> {
    let mut config = match kind {
        ChartKind::Bar | ChartKind::Line => {
            let (categories, values) = axis_parts(kind, shaped)?;
            check_axis(kind, categories, values)?;
            debug!(%kind, points = categories.len(), "synthesizing chart config");
            let tooltip = if kind == ChartKind::Line {
                json!({"trigger": "axis"})
            } else {
                json!({})
            };
            json!({
                "title": {"text": options.title},
                "tooltip": tooltip,
                "xAxis": {"type": "category", "data": categories},
                "yAxis": {"type": "value"},
                "series": [{"type": kind.as_str(), "data": values}]
            })
        }
        ChartKind::Pie => {
            let entries = pie_entries(shaped)?;
            check_points(entries)?;
            debug!(%kind, points = entries.len(), "synthesizing chart config");
            json!({
                "title": {"text": options.title, "left": "center"},
                "tooltip": {"trigger": "item"},
                "series": [{"type": "pie", "radius": "50%", "data": entries}]
            })
        }
    };

    if let Some(subtitle) = &options.subtitle {
        config["title"]["subtext"] = json!(subtitle);
    }
    if let Some(name) = &options.series_name {
        config["series"][0]["name"] = json!(name);
    }
    Ok(config)
}
