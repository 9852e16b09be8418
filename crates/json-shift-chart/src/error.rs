use json_shift::{ShiftError, WalkError};
use thiserror::Error;

use crate::kind::ChartKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("data does not fit a {kind} chart: {reason}")]
    ShapeMismatch { kind: ChartKind, reason: String },

    #[error("unknown chart kind {0:?}, expected bar, line or pie")]
    UnknownChartKind(String),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    #[error(transparent)]
    Shift(#[from] ShiftError),
}

impl From<WalkError> for ChartError {
    fn from(e: WalkError) -> Self {
        ChartError::Shift(e.into())
    }
}

impl ChartError {
    pub(crate) fn shape(kind: ChartKind, reason: impl Into<String>) -> Self {
        ChartError::ShapeMismatch {
            kind,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChartError::ShapeMismatch { .. } => "ShapeMismatch",
            ChartError::UnknownChartKind(_) => "UnknownChartKind",
            ChartError::UnknownPreset(_) => "UnknownPreset",
            ChartError::Shift(e) => e.kind(),
        }
    }
}
