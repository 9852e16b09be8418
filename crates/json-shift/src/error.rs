use thiserror::Error;

/// Errors raised while compiling a shift spec. Nothing has touched input
/// data yet when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("malformed key pattern {pattern:?}: {reason}")]
    MalformedKeyPattern { pattern: String, reason: String },

    #[error("malformed output template {template:?}: {reason}")]
    MalformedOutputTemplate { template: String, reason: String },

    #[error("unsupported operation: {0}")]
    UnsupportedOperationKind(String),

    #[error("spec is not valid JSON: {0}")]
    InvalidJson(String),
}

impl CompileError {
    pub(crate) fn key(pattern: &str, reason: impl Into<String>) -> Self {
        CompileError::MalformedKeyPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        CompileError::MalformedOutputTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable identifier for structured error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::MalformedKeyPattern { .. } => "MalformedKeyPattern",
            CompileError::MalformedOutputTemplate { .. } => "MalformedOutputTemplate",
            CompileError::UnsupportedOperationKind(_) => "UnsupportedOperationKind",
            CompileError::InvalidJson(_) => "InvalidJson",
        }
    }
}

/// Errors raised while resolving emissions into the output tree. Any of
/// these aborts the whole transformation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("capture reference &{reference} in {template:?} is out of range: {available} capture(s) bound")]
    CaptureReferenceOutOfRange {
        template: String,
        reference: usize,
        available: usize,
    },

    #[error("capture group &({reference},{group}) in {template:?} is out of range: capture has {available} group(s)")]
    CaptureGroupOutOfRange {
        template: String,
        reference: usize,
        group: usize,
        available: usize,
    },

    #[error("capture {capture:?} used as an array index in {template:?} is not a non-negative integer")]
    NonNumericIndex { template: String, capture: String },

    #[error("capture {capture:?} used as an array index in {template:?} exceeds the maximum index {max}")]
    IndexOutOfRange {
        template: String,
        capture: String,
        max: usize,
    },
}

impl WalkError {
    pub fn kind(&self) -> &'static str {
        match self {
            WalkError::CaptureReferenceOutOfRange { .. } => "CaptureReferenceOutOfRange",
            WalkError::CaptureGroupOutOfRange { .. } => "CaptureGroupOutOfRange",
            WalkError::NonNumericIndex { .. } => "NonNumericIndex",
            WalkError::IndexOutOfRange { .. } => "IndexOutOfRange",
        }
    }
}

/// Either phase failed. Returned by the one-shot helpers that compile and
/// transform in a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl ShiftError {
    pub fn kind(&self) -> &'static str {
        match self {
            ShiftError::Compile(e) => e.kind(),
            ShiftError::Walk(e) => e.kind(),
        }
    }
}
