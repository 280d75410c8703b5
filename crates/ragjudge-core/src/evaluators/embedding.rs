use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use ragjudge_types::{EvaluatorResult, Score};

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::request::{ensure_exact_fields, EvalRequest, Field};

const FIELDS: [Field; 2] = [Field::Outputs, Field::ReferenceOutputs];

/// An embedding backend. Real implementations call out to a model
/// endpoint; tests return fixed vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EvalError>;
}

/// Cosine similarity of outputs vs reference outputs under an injected
/// embedding backend.
pub struct EmbeddingSimilarityEvaluator {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingSimilarityEvaluator {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl Evaluator for EmbeddingSimilarityEvaluator {
    fn feedback_key(&self) -> &str {
        "embedding_similarity"
    }

    fn required_fields(&self) -> &[Field] {
        &FIELDS
    }

    async fn evaluate(&self, request: &EvalRequest) -> Result<EvaluatorResult, EvalError> {
        ensure_exact_fields(self.feedback_key(), &FIELDS, request)?;
        let o = text_of(request.get(Field::Outputs).unwrap_or(&Value::Null));
        let r = text_of(request.get(Field::ReferenceOutputs).unwrap_or(&Value::Null));

        let o_vec = self.embedder.embed(&o).await?;
        let r_vec = self.embedder.embed(&r).await?;

        let similarity = cosine_similarity(&o_vec, &r_vec);
        Ok(EvaluatorResult::new(
            self.feedback_key(),
            Score::Float(similarity),
        ))
    }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        _ => v.to_string(),
    }
}

/// Plain cosine; empty, zero or mismatched vectors score 0.
fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
