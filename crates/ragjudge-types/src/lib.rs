use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tabled::Tabled;

/// A judge verdict. Boolean for pass/fail rubrics, float in [0, 1] for
/// graded ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
	Bool(bool),
	Float(f64),
}

impl Score {
	/// Numeric view of the score; booleans map to 1.0 / 0.0.
	pub fn as_f64(&self) -> f64 {
		match self {
			Score::Bool(true) => 1.0,
			Score::Bool(false) => 0.0,
			Score::Float(v) => *v,
		}
	}
}

impl fmt::Display for Score {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Score::Bool(b) => write!(f, "{}", b),
			Score::Float(v) => write!(f, "{:.3}", v),
		}
	}
}

/// Token counts reported by the judge model for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
	pub input_tokens: u32,
	pub output_tokens: u32,
	pub total_tokens: u32,
}

/// Outcome of one evaluator invocation: the feedback key it was bound
/// to, the score, and the judge's rationale when one was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorResult {
	pub key: String,
	pub score: Score,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Judge model name, token usage and similar extras.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,
}

impl EvaluatorResult {
	pub fn new(key: impl Into<String>, score: Score) -> Self {
		Self { key: key.into(), score, comment: None, metadata: None }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
	pub metrics: usize,
	pub avg_score: f64,
}

/// One full pass of a suite over a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
	pub started_at: DateTime<Utc>,
	pub duration_ms: u64,
	pub results: Vec<EvaluatorResult>,
	pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
struct SummaryRow {
	key: String,
	score: String,
	comment: String,
}

impl RunReport {
	pub fn summarize(results: &[EvaluatorResult]) -> RunSummary {
		let metrics = results.len();
		let avg_score = if metrics == 0 {
			0.0
		} else {
			let sum: f64 = results.iter().map(|r| r.score.as_f64()).sum();
			sum / metrics as f64
		};

		RunSummary { metrics, avg_score }
	}

	pub fn summary_table(&self) -> String {
        use tabled::Table;
		let rows: Vec<SummaryRow> = self.results.iter().map(|r| {
			SummaryRow {
				key: r.key.clone(),
				score: r.score.to_string(),
				comment: truncate(r.comment.clone().unwrap_or_default(), 64),
			}
		}).collect();

		let table = Table::new(rows);
		let table_str = table.to_string();

		let summary_text = format!(
			"Metrics: {}  Avg score: {:.3}  Took: {}ms",
			self.summary.metrics,
			self.summary.avg_score,
			self.duration_ms
		);

		format!("{}\n\n{}\n", table_str, summary_text)
	}
}

fn truncate(s: String, max_len: usize) -> String {
	if s.len() <= max_len {
		return s;
	}
	let mut truncated = s.chars().take(max_len.saturating_sub(1)).collect::<String>();
	truncated.push('…');
	truncated
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn score_serializes_untagged() {
		assert_eq!(serde_json::to_string(&Score::Bool(true)).unwrap(), "true");
		assert_eq!(serde_json::to_string(&Score::Float(0.85)).unwrap(), "0.85");
	}

	#[test]
	fn score_deserializes_both_shapes() {
		let b: Score = serde_json::from_value(json!(false)).unwrap();
		assert_eq!(b, Score::Bool(false));
		let f: Score = serde_json::from_value(json!(0.4)).unwrap();
		assert_eq!(f, Score::Float(0.4));
	}

	#[test]
	fn summarize_averages_bools_and_floats() {
		let results = vec![
			EvaluatorResult::new("correctness", Score::Bool(true)),
			EvaluatorResult::new("groundedness", Score::Float(0.5)),
		];
		let summary = RunReport::summarize(&results);
		assert_eq!(summary.metrics, 2);
		assert!((summary.avg_score - 0.75).abs() < 1e-9);
	}

	#[test]
	fn summarize_empty_is_zero() {
		let summary = RunReport::summarize(&[]);
		assert_eq!(summary.metrics, 0);
		assert_eq!(summary.avg_score, 0.0);
	}

	#[test]
	fn result_omits_empty_optionals() {
		let json = serde_json::to_value(EvaluatorResult::new("helpfulness", Score::Bool(true))).unwrap();
		assert_eq!(json, json!({"key": "helpfulness", "score": true}));
	}

	#[test]
	fn truncate_marks_long_text() {
		assert_eq!(truncate("short".to_string(), 10), "short");
		let long = "x".repeat(80);
		let cut = truncate(long, 8);
		assert_eq!(cut.chars().count(), 8);
		assert!(cut.ends_with('…'));
	}
}
