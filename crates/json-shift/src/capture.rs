//! Capture stack maintained while walking the input.

use crate::error::WalkError;
use crate::template::CaptureRef;

/// A key bound by a matcher (`*`, glob or alternation) on the way down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    key: String,
    groups: Vec<String>,
}

impl Capture {
    pub fn new(key: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            key: key.into(),
            groups,
        }
    }

    /// The full matched key. For array elements this is the decimal index.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Group `0` is the whole key, group `m` is the text consumed by the
    /// `m`-th `*` of the pattern.
    pub fn group(&self, group: usize) -> Option<&str> {
        if group == 0 {
            Some(&self.key)
        } else {
            self.groups.get(group - 1).map(String::as_str)
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Ordered stack of captures for the branch currently being walked.
///
/// Depth `1` is the innermost (most recently pushed) capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureContext {
    stack: Vec<Capture>,
}

impl CaptureContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, capture: Capture) {
        self.stack.push(capture);
    }

    pub fn pop(&mut self) -> Option<Capture> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the capture `depth` levels up, `1` being the innermost.
    pub fn get(&self, depth: usize) -> Option<&Capture> {
        if depth == 0 || depth > self.stack.len() {
            return None;
        }
        self.stack.get(self.stack.len() - depth)
    }

    /// Resolves a capture reference to the text it stands for.
    ///
    /// `template` is only used to build the error message.
    pub fn resolve(&self, reference: &CaptureRef, template: &str) -> Result<&str, WalkError> {
        let capture =
            self.get(reference.depth)
                .ok_or_else(|| WalkError::CaptureReferenceOutOfRange {
                    template: template.to_string(),
                    reference: reference.depth,
                    available: self.stack.len(),
                })?;
        capture
            .group(reference.group)
            .ok_or_else(|| WalkError::CaptureGroupOutOfRange {
                template: template.to_string(),
                reference: reference.depth,
                group: reference.group,
                available: capture.group_count(),
            })
    }
}
