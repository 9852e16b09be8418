//! Compiled matcher tree.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CompileError;
use crate::key::{parse_key, KeyPattern, Matcher};
use crate::template::OutputTemplate;

/// One level of the input-side match pattern.
///
/// A node is either a leaf holding the output templates its value is written
/// to, or an interior node holding children. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecNode {
    Leaf(Vec<OutputTemplate>),
    Interior(Interior),
}

/// Children of an interior node, grouped by how they are matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interior {
    literals: IndexMap<String, SpecNode>,
    matchers: Vec<(Matcher, SpecNode)>,
    virtuals: Vec<(VirtualLeaf, Vec<OutputTemplate>)>,
}

/// Leaves that fire once per visit of their parent without consuming a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualLeaf {
    /// `@`
    SelfValue,
    /// `$N`
    CaptureKey(usize),
    /// `#text`
    Constant(String),
}

impl Interior {
    /// Child registered under exactly `key`.
    pub fn literal(&self, key: &str) -> Option<&SpecNode> {
        self.literals.get(key)
    }

    pub fn literals(&self) -> impl Iterator<Item = (&str, &SpecNode)> {
        self.literals.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn matchers(&self) -> &[(Matcher, SpecNode)] {
        &self.matchers
    }

    pub fn virtuals(&self) -> &[(VirtualLeaf, Vec<OutputTemplate>)] {
        &self.virtuals
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.matchers.is_empty() && self.virtuals.is_empty()
    }
}

impl SpecNode {
    /// Compile a `spec` object (or any nested value of one).
    pub fn compile(value: &Value) -> Result<Self, CompileError> {
        match value {
            Value::Object(map) => {
                let mut interior = Interior::default();
                for (raw_key, child) in map {
                    match parse_key(raw_key)? {
                        KeyPattern::Literal(key) => {
                            if interior.literals.contains_key(&key) {
                                return Err(CompileError::key(
                                    raw_key,
                                    format!("duplicates another spec key for literal {key:?}"),
                                ));
                            }
                            interior.literals.insert(key, SpecNode::compile(child)?);
                        }
                        KeyPattern::Matcher(matcher) => {
                            interior.matchers.push((matcher, SpecNode::compile(child)?));
                        }
                        KeyPattern::SelfValue => {
                            interior.virtuals.push((VirtualLeaf::SelfValue, virtual_outputs(raw_key, child)?));
                        }
                        KeyPattern::CaptureKey(depth) => {
                            interior.virtuals.push((VirtualLeaf::CaptureKey(depth), virtual_outputs(raw_key, child)?));
                        }
                        KeyPattern::Constant(text) => {
                            interior.virtuals.push((VirtualLeaf::Constant(text), virtual_outputs(raw_key, child)?));
                        }
                    }
                }
                Ok(SpecNode::Interior(interior))
            }
            other => Ok(SpecNode::Leaf(compile_outputs(other)?)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SpecNode::Leaf(_))
    }
}

fn virtual_outputs(raw_key: &str, child: &Value) -> Result<Vec<OutputTemplate>, CompileError> {
    if child.is_object() {
        return Err(CompileError::key(raw_key, "virtual keys must map to an output path"));
    }
    compile_outputs(child)
}

fn compile_outputs(value: &Value) -> Result<Vec<OutputTemplate>, CompileError> {
    match value {
        Value::String(path) => Ok(vec![OutputTemplate::parse(path)?]),
        Value::Array(paths) if !paths.is_empty() => paths
            .iter()
            .map(|path| match path {
                Value::String(path) => OutputTemplate::parse(path),
                other => Err(CompileError::template(
                    &other.to_string(),
                    "output path lists may only contain strings",
                )),
            })
            .collect(),
        Value::Array(_) => Err(CompileError::template("[]", "output path list is empty")),
        other => Err(CompileError::template(
            &other.to_string(),
            "expected an output path, a list of output paths, or a nested spec object",
        )),
    }
}
