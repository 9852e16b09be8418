//! Lock-step descent of a compiled spec tree and an input document.

use std::borrow::Cow;

use serde_json::Value;

use crate::capture::CaptureContext;
use crate::error::WalkError;
use crate::node::{Interior, SpecNode, VirtualLeaf};
use crate::template::OutputTemplate;

/// A value reaching a leaf, with the captures bound on the way there.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission<'s, 'v> {
    pub template: &'s OutputTemplate,
    pub value: Cow<'v, Value>,
    pub captures: CaptureContext,
}

/// Receives emissions in input traversal order.
pub trait EmissionSink<'s, 'v> {
    fn emit(
        &mut self,
        template: &'s OutputTemplate,
        value: Cow<'v, Value>,
        captures: &CaptureContext,
    ) -> Result<(), WalkError>;
}

impl<'s, 'v> EmissionSink<'s, 'v> for Vec<Emission<'s, 'v>> {
    fn emit(
        &mut self,
        template: &'s OutputTemplate,
        value: Cow<'v, Value>,
        captures: &CaptureContext,
    ) -> Result<(), WalkError> {
        self.push(Emission {
            template,
            value,
            captures: captures.clone(),
        });
        Ok(())
    }
}

/// Collect every emission produced by matching `node` against `input`.
pub fn walk<'s, 'v>(node: &'s SpecNode, input: &'v Value) -> Result<Vec<Emission<'s, 'v>>, WalkError> {
    let mut emissions = Vec::new();
    walk_into(node, input, &mut emissions)?;
    Ok(emissions)
}

/// Stream emissions into `sink` instead of collecting them.
pub fn walk_into<'s, 'v, S>(node: &'s SpecNode, input: &'v Value, sink: &mut S) -> Result<(), WalkError>
where
    S: EmissionSink<'s, 'v>,
{
    let mut walker = Walker {
        sink,
        captures: CaptureContext::new(),
    };
    walker.visit(node, input)
}

struct Walker<'a, S> {
    sink: &'a mut S,
    captures: CaptureContext,
}

impl<'a, 's, 'v, S> Walker<'a, S>
where
    S: EmissionSink<'s, 'v>,
{
    fn visit(&mut self, node: &'s SpecNode, value: &'v Value) -> Result<(), WalkError> {
        match node {
            SpecNode::Leaf(templates) => {
                for template in templates {
                    self.sink.emit(template, Cow::Borrowed(value), &self.captures)?;
                }
                Ok(())
            }
            SpecNode::Interior(interior) => self.visit_interior(interior, value),
        }
    }

    fn visit_interior(&mut self, interior: &'s Interior, value: &'v Value) -> Result<(), WalkError> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.visit_entry(interior, key, child)?;
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.visit_entry(interior, &index.to_string(), child)?;
                }
            }
            _ => {}
        }

        for (leaf, templates) in interior.virtuals() {
            let emitted = match leaf {
                VirtualLeaf::SelfValue => Cow::Borrowed(value),
                VirtualLeaf::Constant(text) => Cow::Owned(Value::String(text.clone())),
                VirtualLeaf::CaptureKey(depth) => {
                    let capture = self.captures.get(*depth).ok_or_else(|| {
                        WalkError::CaptureReferenceOutOfRange {
                            template: format!("${depth}"),
                            reference: *depth,
                            available: self.captures.len(),
                        }
                    })?;
                    Cow::Owned(Value::String(capture.key().to_string()))
                }
            };
            for template in templates {
                self.sink.emit(template, emitted.clone(), &self.captures)?;
            }
        }
        Ok(())
    }

    /// Broadcast one input entry to every child that matches its key.
    fn visit_entry(&mut self, interior: &'s Interior, key: &str, child: &'v Value) -> Result<(), WalkError> {
        if let Some(next) = interior.literal(key) {
            self.visit(next, child)?;
        }
        for (matcher, next) in interior.matchers() {
            if let Some(capture) = matcher.matches(key) {
                self.captures.push(capture);
                let result = self.visit(next, child);
                self.captures.pop();
                result?;
            }
        }
        Ok(())
    }
}
