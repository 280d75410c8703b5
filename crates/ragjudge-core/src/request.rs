use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named slots of an evaluation request bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Inputs,
    Outputs,
    ReferenceOutputs,
    Context,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Inputs,
        Field::Outputs,
        Field::ReferenceOutputs,
        Field::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Inputs => "inputs",
            Field::Outputs => "outputs",
            Field::ReferenceOutputs => "reference_outputs",
            Field::Context => "context",
        }
    }

    /// Token a prompt template uses to interpolate this field.
    pub(crate) fn placeholder(&self) -> &'static str {
        match self {
            Field::Inputs => "{inputs}",
            Field::Outputs => "{outputs}",
            Field::ReferenceOutputs => "{reference_outputs}",
            Field::Context => "{context}",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pieces of one RAG exchange an evaluator may look at: the user's
/// question, the pipeline's answer, a ground-truth answer, the retrieved
/// documents. All optional here; the prompt an evaluator was built with
/// dictates which ones a call must carry.
///
/// Values are plain JSON so callers can pass bare strings or structured
/// objects interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl EvalRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(mut self, value: impl Into<Value>) -> Self {
        self.inputs = Some(value.into());
        self
    }

    pub fn outputs(mut self, value: impl Into<Value>) -> Self {
        self.outputs = Some(value.into());
        self
    }

    pub fn reference_outputs(mut self, value: impl Into<Value>) -> Self {
        self.reference_outputs = Some(value.into());
        self
    }

    pub fn context(mut self, value: impl Into<Value>) -> Self {
        self.context = Some(value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        match field {
            Field::Inputs => self.inputs.as_ref(),
            Field::Outputs => self.outputs.as_ref(),
            Field::ReferenceOutputs => self.reference_outputs.as_ref(),
            Field::Context => self.context.as_ref(),
        }
    }

    /// Fields actually present, in canonical order.
    pub fn provided(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}

/// The field-shape invariant every evaluator holds its requests to: the
/// bundle must carry `fields` exactly, with nothing missing and nothing
/// extra.
pub(crate) fn ensure_exact_fields(
    key: &str,
    fields: &[Field],
    request: &EvalRequest,
) -> Result<(), crate::error::EvalError> {
    use crate::error::EvalError;

    for field in fields {
        if request.get(*field).is_none() {
            return Err(EvalError::MissingField {
                key: key.to_string(),
                field: *field,
            });
        }
    }
    for field in request.provided() {
        if !fields.contains(&field) {
            return Err(EvalError::UnexpectedField {
                key: key.to_string(),
                field,
            });
        }
    }
    Ok(())
}
