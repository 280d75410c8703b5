use serde_json::Value;

use crate::error::EvalError;
use crate::judge::ScoreKind;
use crate::request::{EvalRequest, Field};

/// Judge prompt for answer correctness against a ground-truth answer.
pub const CORRECTNESS_PROMPT: &str = r#"You are an expert data labeler evaluating model outputs for correctness.

A correct answer states the same facts as the ground-truth answer. Wording may differ; meaning may not. An answer that contradicts the ground truth, invents details, or omits something essential is not correct.

Question:
{inputs}

Candidate answer:
{outputs}

Ground-truth answer:
{reference_outputs}"#;

/// Judge prompt for how well an answer serves the question, independent
/// of factual accuracy.
pub const RAG_HELPFULNESS_PROMPT: &str = r#"You are an expert data labeler evaluating model outputs for helpfulness.

A helpful answer addresses what the user actually asked, is direct about any part of the question it cannot answer, and adds no filler or digressions. Judge only how well the answer serves the question; factual accuracy is graded elsewhere.

Question:
{inputs}

Answer:
{outputs}"#;

/// Judge prompt for whether retrieved documents are topically relevant
/// to the query, independent of any answer.
pub const RAG_RETRIEVAL_RELEVANCE_PROMPT: &str = r#"You are an expert data labeler judging whether retrieved documents are relevant to a search query.

Relevant documents are topically on point for the question: a reader could plausibly extract an answer from them. Judge the documents against the question only; whether any final answer was right plays no part here.

Question:
{inputs}

Retrieved documents:
{context}"#;

/// Judge prompt for whether an answer is fully supported by the
/// retrieved documents, independent of the question.
pub const RAG_GROUNDEDNESS_PROMPT: &str = r#"You are an expert data labeler judging whether an answer is grounded in retrieved documents.

A grounded answer makes no claim the documents do not support. Every statement must be traceable to the provided text; outside knowledge does not count, even when it is true. Judge the answer against the documents only; the original question plays no part here.

Retrieved documents:
{context}

Answer:
{outputs}"#;

const BOOLEAN_FORMAT: &str = r#"Respond only with a JSON object of the form {"reasoning": "<one short paragraph>", "score": true|false}. Work through the rubric in "reasoning" first, then commit: true if the rubric is met, false otherwise."#;

const CONTINUOUS_FORMAT: &str = r#"Respond only with a JSON object of the form {"reasoning": "<one short paragraph>", "score": <number>}. Work through the rubric in "reasoning" first, then commit to a score between 0.0 and 1.0, where 1.0 means the rubric is fully met."#;

/// A judge prompt template plus the request fields it interpolates.
///
/// Fields are read off the template itself: every known placeholder the
/// text mentions becomes a field each request must carry, and the only
/// fields a request may carry.
#[derive(Debug, Clone)]
pub struct JudgePrompt {
    name: String,
    template: String,
    fields: Vec<Field>,
}

impl JudgePrompt {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, EvalError> {
        let name = name.into();
        let template = template.into();
        let fields: Vec<Field> = Field::ALL
            .iter()
            .copied()
            .filter(|f| template.contains(f.placeholder()))
            .collect();
        if fields.is_empty() {
            return Err(EvalError::Configuration(format!(
                "prompt template `{name}` references none of the known placeholders ({})",
                Field::ALL.map(|f| f.placeholder()).join(", ")
            )));
        }
        Ok(Self { name, template, fields })
    }

    /// The four prebuilt metrics, by name.
    pub fn builtin(name: &str) -> Result<Self, EvalError> {
        let template = match name {
            "correctness" => CORRECTNESS_PROMPT,
            "helpfulness" => RAG_HELPFULNESS_PROMPT,
            "retrieval_relevance" => RAG_RETRIEVAL_RELEVANCE_PROMPT,
            "groundedness" => RAG_GROUNDEDNESS_PROMPT,
            other => {
                return Err(EvalError::Configuration(format!(
                    "unknown metric `{other}` (expected correctness, helpfulness, retrieval_relevance or groundedness)"
                )))
            }
        };
        Self::new(name, template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Exactly the fields a request to this prompt must supply.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Reject any request whose field set differs from the template's.
    pub fn check_fields(&self, key: &str, request: &EvalRequest) -> Result<(), EvalError> {
        crate::request::ensure_exact_fields(key, &self.fields, request)
    }

    /// Interpolate the request into the template and append the score
    /// format instructions. One pass, left to right: substituted text
    /// is never re-scanned, and a placeholder token inside a field
    /// value stays literal.
    pub fn render(&self, request: &EvalRequest, kind: ScoreKind) -> Result<String, EvalError> {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some((at, field)) = next_placeholder(rest, &self.fields) {
            let value = request.get(field).ok_or_else(|| EvalError::MissingField {
                key: self.name.clone(),
                field,
            })?;
            rendered.push_str(&rest[..at]);
            rendered.push_str(&field_text(value));
            rest = &rest[at + field.placeholder().len()..];
        }
        rendered.push_str(rest);

        let format_block = match kind {
            ScoreKind::Boolean => BOOLEAN_FORMAT,
            ScoreKind::Continuous => CONTINUOUS_FORMAT,
        };
        Ok(format!("{}\n\n{}", rendered.trim_end(), format_block))
    }
}

/// Strings go in verbatim; anything structured is pretty-printed so the
/// judge sees readable JSON.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Leftmost placeholder of any required field in `text`.
fn next_placeholder(text: &str, fields: &[Field]) -> Option<(usize, Field)> {
    fields
        .iter()
        .filter_map(|f| text.find(f.placeholder()).map(|at| (at, *f)))
        .min_by_key(|(at, _)| *at)
}
