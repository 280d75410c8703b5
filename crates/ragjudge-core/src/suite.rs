use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use ragjudge_types::RunReport;

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::request::{EvalRequest, Field};

/// One RAG exchange to judge: the question, the pipeline's answer, and
/// whatever ground truth and retrieved documents exist for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagCase {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub question: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub answer: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference_answer: Option<String>,
	/// Retrieved documents, any JSON shape.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub documents: Option<Value>,
}

impl RagCase {
	/// Assemble the bundle an evaluator with these fields expects:
	/// exactly the asked-for slots, filled from the case.
	pub fn request_for(&self, key: &str, fields: &[Field]) -> Result<EvalRequest, EvalError> {
		let mut request = EvalRequest::new();
		for field in fields {
			match field {
				Field::Inputs => {
					let question = self.slot(key, *field, &self.question)?;
					request.inputs = Some(json!({ "question": question }));
				}
				Field::Outputs => {
					let answer = self.slot(key, *field, &self.answer)?;
					request.outputs = Some(json!({ "answer": answer }));
				}
				Field::ReferenceOutputs => {
					let reference = self.slot(key, *field, &self.reference_answer)?;
					request.reference_outputs = Some(Value::String(reference.clone()));
				}
				Field::Context => {
					let documents = match &self.documents {
						Some(docs) => docs.clone(),
						None => {
							return Err(EvalError::MissingField {
								key: key.to_string(),
								field: *field,
							})
						}
					};
					request.context = Some(json!({ "documents": documents }));
				}
			}
		}
		Ok(request)
	}

	fn slot<'a>(
		&self,
		key: &str,
		field: Field,
		value: &'a Option<String>,
	) -> Result<&'a String, EvalError> {
		value.as_ref().ok_or_else(|| EvalError::MissingField {
			key: key.to_string(),
			field,
		})
	}
}

pub struct RagSuiteBuilder {
	evaluators: Vec<Arc<dyn Evaluator>>,
}

impl RagSuiteBuilder {
	pub fn new() -> Self {
		Self { evaluators: Vec::new() }
	}

	pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
		self.evaluators.push(evaluator);
		self
	}

	pub fn evaluators<I>(mut self, evaluators: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Evaluator>>,
	{
		self.evaluators.extend(evaluators);
		self
	}

	pub fn build(self) -> Result<RagSuite, EvalError> {
		if self.evaluators.is_empty() {
			return Err(EvalError::Configuration(
				"at least one evaluator must be set".to_string(),
			));
		}
		Ok(RagSuite { evaluators: self.evaluators })
	}
}

/// A fixed set of evaluators run over one case at a time.
pub struct RagSuite {
	evaluators: Vec<Arc<dyn Evaluator>>,
}

// Evaluators are trait objects; show their keys instead.
impl fmt::Debug for RagSuite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let keys: Vec<&str> = self.evaluators.iter().map(|e| e.feedback_key()).collect();
		f.debug_struct("RagSuite").field("evaluators", &keys).finish()
	}
}

impl RagSuite {
	pub fn builder() -> RagSuiteBuilder {
		RagSuiteBuilder::new()
	}

	/// Judge one case with every evaluator, strictly in registration
	/// order. Each call is awaited before the next starts; the first
	/// failure ends the run.
	pub async fn run(&self, case: &RagCase) -> Result<RunReport, EvalError> {
		let started_at = Utc::now();
		let start = Instant::now();
		let mut results = Vec::with_capacity(self.evaluators.len());

		for evaluator in &self.evaluators {
			let request =
				case.request_for(evaluator.feedback_key(), evaluator.required_fields())?;
			let result = evaluator.evaluate(&request).await?;
			info!(key = %result.key, score = %result.score, "metric judged");
			results.push(result);
		}

		let summary = RunReport::summarize(&results);
		Ok(RunReport {
			started_at,
			duration_ms: start.elapsed().as_millis() as u64,
			results,
			summary,
		})
	}
}
