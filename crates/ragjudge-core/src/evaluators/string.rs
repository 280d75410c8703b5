use async_trait::async_trait;
use serde_json::Value;
use strsim::levenshtein;

use ragjudge_types::{EvaluatorResult, Score};

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::request::{ensure_exact_fields, EvalRequest, Field};

const FIELDS: [Field; 2] = [Field::Outputs, Field::ReferenceOutputs];

/// Verbatim equality of outputs and reference outputs.
pub struct ExactMatchEvaluator;

#[async_trait]
impl Evaluator for ExactMatchEvaluator {
	fn feedback_key(&self) -> &str {
		"exact_match"
	}

	fn required_fields(&self) -> &[Field] {
		&FIELDS
	}

	async fn evaluate(&self, request: &EvalRequest) -> Result<EvaluatorResult, EvalError> {
		ensure_exact_fields(self.feedback_key(), &FIELDS, request)?;
		let matched = request.outputs == request.reference_outputs;
		Ok(EvaluatorResult::new(self.feedback_key(), Score::Bool(matched)))
	}
}

/// Normalized Levenshtein similarity of outputs vs reference outputs,
/// as a float in [0, 1].
pub struct LevenshteinEvaluator;

#[async_trait]
impl Evaluator for LevenshteinEvaluator {
	fn feedback_key(&self) -> &str {
		"levenshtein"
	}

	fn required_fields(&self) -> &[Field] {
		&FIELDS
	}

	async fn evaluate(&self, request: &EvalRequest) -> Result<EvaluatorResult, EvalError> {
		ensure_exact_fields(self.feedback_key(), &FIELDS, request)?;
		let o = stringify(request.get(Field::Outputs).unwrap_or(&Value::Null));
		let r = stringify(request.get(Field::ReferenceOutputs).unwrap_or(&Value::Null));
		let max_len = o.len().max(r.len()).max(1) as f64;
		let similarity = 1.0 - (levenshtein(&o, &r) as f64 / max_len);
		Ok(EvaluatorResult::new(self.feedback_key(), Score::Float(similarity)))
	}
}

fn stringify(v: &Value) -> String {
	match v {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		_ => v.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn exact_match_is_a_verdict() {
		let evaluator = ExactMatchEvaluator;
		let same = EvalRequest::new()
			.outputs("four weeks")
			.reference_outputs("four weeks");
		let result = evaluator.evaluate(&same).await.unwrap();
		assert_eq!(result.key, "exact_match");
		assert_eq!(result.score, Score::Bool(true));

		let different = EvalRequest::new()
			.outputs("four weeks")
			.reference_outputs("one month");
		let result = evaluator.evaluate(&different).await.unwrap();
		assert_eq!(result.score, Score::Bool(false));
	}

	#[tokio::test]
	async fn exact_match_compares_structured_values() {
		let evaluator = ExactMatchEvaluator;
		let request = EvalRequest::new()
			.outputs(json!({"weeks": 4}))
			.reference_outputs(json!({"weeks": 4}));
		let result = evaluator.evaluate(&request).await.unwrap();
		assert_eq!(result.score, Score::Bool(true));
	}

	#[tokio::test]
	async fn levenshtein_scores_similarity() {
		let evaluator = LevenshteinEvaluator;
		let identical = EvalRequest::new()
			.outputs("kitten")
			.reference_outputs("kitten");
		let result = evaluator.evaluate(&identical).await.unwrap();
		assert_eq!(result.score, Score::Float(1.0));

		let close = EvalRequest::new()
			.outputs("kitten")
			.reference_outputs("sitting");
		let result = evaluator.evaluate(&close).await.unwrap();
		match result.score {
			Score::Float(v) => assert!((v - (1.0 - 3.0 / 7.0)).abs() < 1e-9),
			other => panic!("expected a float score, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn string_evaluators_hold_the_field_shape() {
		let evaluator = LevenshteinEvaluator;
		let missing = EvalRequest::new().outputs("four weeks");
		let err = evaluator.evaluate(&missing).await.unwrap_err();
		assert!(matches!(
			err,
			EvalError::MissingField { field: Field::ReferenceOutputs, .. }
		));

		let extra = EvalRequest::new()
			.outputs("four weeks")
			.reference_outputs("four weeks")
			.inputs("how long?");
		let err = evaluator.evaluate(&extra).await.unwrap_err();
		assert!(matches!(
			err,
			EvalError::UnexpectedField { field: Field::Inputs, .. }
		));
	}
}
