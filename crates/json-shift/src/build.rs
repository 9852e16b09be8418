//! Output tree construction.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::trace;

use crate::capture::CaptureContext;
use crate::error::WalkError;
use crate::template::{KeyPiece, OutputTemplate, PathSegment, MAX_ARRAY_INDEX};
use crate::walk::{Emission, EmissionSink};

/// A template segment with its captures substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Append,
    Index(usize),
}

/// Accumulates emissions into a single output document.
///
/// Vacant slots (absent or `null`) take whichever container the next
/// segment needs; anything else in the way is overwritten, so the last
/// write to a location wins.
#[derive(Debug, Default)]
pub struct OutputBuilder {
    root: Value,
    written: bool,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at the location `template` resolves to.
    pub fn write(
        &mut self,
        template: &OutputTemplate,
        value: Value,
        captures: &CaptureContext,
    ) -> Result<(), WalkError> {
        let steps = resolve(template, captures)?;
        trace!(template = template.as_str(), ?steps, "write");

        let mut slot = &mut self.root;
        for step in &steps {
            slot = match step {
                Step::Key(key) => object_at(slot).entry(key.clone()).or_insert(Value::Null),
                Step::Append => {
                    let items = array_at(slot);
                    items.push(Value::Null);
                    let last = items.len() - 1;
                    &mut items[last]
                }
                Step::Index(index) => {
                    let len = index.checked_add(1).ok_or_else(|| WalkError::IndexOutOfRange {
                        template: template.as_str().to_string(),
                        capture: index.to_string(),
                        max: MAX_ARRAY_INDEX,
                    })?;
                    let items = array_at(slot);
                    if items.len() < len {
                        items.resize(len, Value::Null);
                    }
                    &mut items[*index]
                }
            };
        }
        *slot = value;
        self.written = true;
        Ok(())
    }

    /// The finished document; `{}` when nothing was written.
    pub fn finish(self) -> Value {
        if self.written {
            self.root
        } else {
            Value::Object(Map::new())
        }
    }
}

impl<'s, 'v> EmissionSink<'s, 'v> for OutputBuilder {
    fn emit(
        &mut self,
        template: &'s OutputTemplate,
        value: Cow<'v, Value>,
        captures: &CaptureContext,
    ) -> Result<(), WalkError> {
        self.write(template, value.into_owned(), captures)
    }
}

/// Build an output document from previously collected emissions.
pub fn build<'s, 'v, I>(emissions: I) -> Result<Value, WalkError>
where
    I: IntoIterator<Item = Emission<'s, 'v>>,
{
    let mut builder = OutputBuilder::new();
    for emission in emissions {
        builder.write(emission.template, emission.value.into_owned(), &emission.captures)?;
    }
    Ok(builder.finish())
}

fn resolve(template: &OutputTemplate, captures: &CaptureContext) -> Result<Vec<Step>, WalkError> {
    template
        .segments()
        .iter()
        .map(|segment| resolve_segment(segment, template, captures))
        .collect()
}

fn resolve_segment(
    segment: &PathSegment,
    template: &OutputTemplate,
    captures: &CaptureContext,
) -> Result<Step, WalkError> {
    match segment {
        PathSegment::Key(pieces) => {
            let mut key = String::new();
            for piece in pieces {
                match piece {
                    KeyPiece::Text(text) => key.push_str(text),
                    KeyPiece::Capture(reference) => {
                        key.push_str(captures.resolve(reference, template.as_str())?)
                    }
                }
            }
            Ok(Step::Key(key))
        }
        PathSegment::Append => Ok(Step::Append),
        PathSegment::Index(index) => Ok(Step::Index(*index)),
        PathSegment::CaptureIndex(reference) => {
            let captured = captures.resolve(reference, template.as_str())?;
            captured_index(captured, template)
        }
    }
}

/// A captured key as an array index: all digits and at most
/// [`MAX_ARRAY_INDEX`]. Digit strings too long for `usize` are out of range,
/// not non-numeric.
fn captured_index(captured: &str, template: &OutputTemplate) -> Result<Step, WalkError> {
    if captured.is_empty() || !captured.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalkError::NonNumericIndex {
            template: template.as_str().to_string(),
            capture: captured.to_string(),
        });
    }
    match captured.parse::<usize>() {
        Ok(index) if index <= MAX_ARRAY_INDEX => Ok(Step::Index(index)),
        _ => Err(WalkError::IndexOutOfRange {
            template: template.as_str().to_string(),
            capture: captured.to_string(),
            max: MAX_ARRAY_INDEX,
        }),
    }
}

fn object_at(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn array_at(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just replaced with an array"),
    }
}
