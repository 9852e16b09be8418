//! Shift specs: an ordered chain of compiled `shift` operations.

use serde_json::Value;
use tracing::debug;

use crate::build::OutputBuilder;
use crate::error::{CompileError, ShiftError, WalkError};
use crate::node::SpecNode;
use crate::walk::walk_into;

/// A single compiled `shift` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    root: SpecNode,
}

impl Operation {
    /// Compile the body of a shift operation (the value of its `spec` key).
    pub fn compile(spec: &Value) -> Result<Self, CompileError> {
        if !spec.is_object() {
            return Err(CompileError::UnsupportedOperationKind(format!(
                "shift operation requires a \"spec\" object, found {}",
                type_name(spec)
            )));
        }
        Ok(Self {
            root: SpecNode::compile(spec)?,
        })
    }

    pub fn root(&self) -> &SpecNode {
        &self.root
    }

    /// Reshape one document. Any walk error discards the partial output.
    pub fn apply(&self, input: &Value) -> Result<Value, WalkError> {
        let mut builder = OutputBuilder::new();
        walk_into(&self.root, input, &mut builder)?;
        Ok(builder.finish())
    }
}

/// A compiled chain of operations. Immutable once built and safe to share
/// across threads; each [`ShiftSpec::transform`] call owns its own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSpec {
    operations: Vec<Operation>,
}

impl ShiftSpec {
    /// Compile a spec document: `[{"operation": "shift", "spec": {...}}, ...]`.
    pub fn compile(doc: &Value) -> Result<Self, CompileError> {
        let entries = doc.as_array().ok_or_else(|| {
            CompileError::UnsupportedOperationKind(format!(
                "spec must be an array of operations, found {}",
                type_name(doc)
            ))
        })?;

        let mut operations = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            operations.push(compile_entry(index, entry)?);
        }
        debug!(operations = operations.len(), "compiled shift spec");
        Ok(Self { operations })
    }

    /// Parse JSON text, then compile it.
    pub fn from_json_str(text: &str) -> Result<Self, CompileError> {
        let doc: Value =
            serde_json::from_str(text).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        Self::compile(&doc)
    }

    /// Wrap a single already-compiled operation.
    pub fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Run every operation in order, feeding each output into the next.
    /// An empty chain returns the input unchanged.
    pub fn transform(&self, input: &Value) -> Result<Value, WalkError> {
        let Some((first, rest)) = self.operations.split_first() else {
            return Ok(input.clone());
        };
        let mut current = first.apply(input)?;
        for operation in rest {
            current = operation.apply(&current)?;
        }
        debug!(operations = self.operations.len(), "transformed document");
        Ok(current)
    }
}

/// Compile `spec` and apply it to `input` in one call.
pub fn shift(spec: &Value, input: &Value) -> Result<Value, ShiftError> {
    Ok(ShiftSpec::compile(spec)?.transform(input)?)
}

fn compile_entry(index: usize, entry: &Value) -> Result<Operation, CompileError> {
    let object = entry.as_object().ok_or_else(|| {
        CompileError::UnsupportedOperationKind(format!(
            "operation #{index} must be an object, found {}",
            type_name(entry)
        ))
    })?;
    match object.get("operation") {
        Some(Value::String(kind)) if kind == "shift" => {}
        Some(Value::String(kind)) => {
            return Err(CompileError::UnsupportedOperationKind(format!(
                "operation #{index} is {kind:?}, only \"shift\" is supported"
            )))
        }
        Some(other) => {
            return Err(CompileError::UnsupportedOperationKind(format!(
                "operation #{index} has a non-string \"operation\": {other}"
            )))
        }
        None => {
            return Err(CompileError::UnsupportedOperationKind(format!(
                "operation #{index} is missing \"operation\""
            )))
        }
    }
    Operation::compile(object.get("spec").unwrap_or(&Value::Null))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
