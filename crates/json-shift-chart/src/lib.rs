//! Chart config synthesis over shift-transformed data.
//!
//! The last step of the records → shift → chart pipeline: take a reshaped
//! document in one of the canonical shapes and produce a declarative
//! renderer config.
//!
//! - bar / line: `{"categories": [...], "values": [...]}`
//! - pie: `[{"name": ..., "value": ...}, ...]`
//!
//! # Example
//!
//! ```
//! use json_shift_chart::{presets, synthesize, ChartKind};
//! use serde_json::json;
//!
//! let records = json!({"Student[]": [
//!     {"grade": "七年级", "count": 3},
//!     {"grade": "八年级", "count": 2}
//! ]});
//!
//! let shaped = presets::get("grade").unwrap().transform(&records).unwrap();
//! let config = synthesize(ChartKind::Bar, &shaped, "学生年级分布").unwrap();
//!
//! assert_eq!(config["xAxis"]["data"], json!(["七年级", "八年级"]));
//! assert_eq!(config["series"][0]["data"], json!([3, 2]));
//! ```

pub mod error;
pub mod kind;
pub mod presets;
pub mod series;
pub mod synth;

pub use error::ChartError;
pub use kind::ChartKind;
pub use presets::{Preset, PresetRun};
pub use series::{ChartSeries, Point};
pub use synth::{synthesize, synthesize_with, ChartOptions};
