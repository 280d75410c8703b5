use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use ragjudge_types::{RunReport, Score};

use crate::error::EvalError;
use crate::judge::{Judge, JudgeReply, JudgeRequest};

/// A judge that always returns the same verdict. Wire it into
/// [`LlmAsJudge::with_judge`](crate::evaluator::LlmAsJudge::with_judge)
/// to run the whole pipeline deterministically, no key and no network.
pub struct CannedJudge {
    score: Score,
    comment: Option<String>,
}

impl CannedJudge {
    pub fn new(score: Score, comment: Option<&str>) -> Self {
        Self {
            score,
            comment: comment.map(|s| s.to_string()),
        }
    }

    /// A judge satisfied with everything.
    pub fn approving() -> Self {
        Self::new(Score::Bool(true), Some("meets the rubric"))
    }

    /// A judge satisfied with nothing.
    pub fn dissenting() -> Self {
        Self::new(Score::Bool(false), Some("does not meet the rubric"))
    }
}

#[async_trait]
impl Judge for CannedJudge {
    async fn score(&self, _request: &JudgeRequest) -> Result<JudgeReply, EvalError> {
        Ok(JudgeReply {
            score: self.score,
            comment: self.comment.clone(),
            usage: None,
        })
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

/// A canned judge that also keeps every prompt it is shown, so tests
/// can assert on what the judge actually saw.
pub struct RecordingJudge {
    score: Score,
    prompts: Mutex<Vec<String>>,
}

impl RecordingJudge {
    pub fn approving() -> Self {
        Self::scoring(Score::Bool(true))
    }

    pub fn scoring(score: Score) -> Self {
        Self {
            score,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Judge for RecordingJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<JudgeReply, EvalError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(JudgeReply {
            score: self.score,
            comment: None,
            usage: None,
        })
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Helper to assert every metric in a report scored at least a
/// threshold.
///
/// Use this in your `#[tokio::test]` functions.
///
/// # Example
/// ```ignore
/// #[tokio::test]
/// async fn test_my_pipeline() -> Result<()> {
///     let suite = RagSuite::builder()
///         .evaluator(groundedness)
///         .evaluator(helpfulness)
///         .build()?;
///
///     let report = suite.run(&case).await?;
///
///     // Every metric at 0.8 or better
///     assert_min_score(&report, 0.8)?;
///
///     Ok(())
/// }
/// ```
pub fn assert_min_score(report: &RunReport, min_score: f64) -> Result<()> {
    for result in &report.results {
        if result.score.as_f64() < min_score {
            anyhow::bail!(
                "metric `{}` scored {:.3}, below threshold {:.3}\n{}",
                result.key,
                result.score.as_f64(),
                min_score,
                report.summary_table()
            );
        }
    }
    Ok(())
}

/// Helper to assert a report's average score meets a threshold.
pub fn assert_avg_score(report: &RunReport, min_avg_score: f64) -> Result<()> {
    if report.summary.avg_score < min_avg_score {
        anyhow::bail!(
            "average score {:.3} is below threshold {:.3}\n{}",
            report.summary.avg_score,
            min_avg_score,
            report.summary_table()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::evaluator::LlmAsJudge;
    use crate::prompts::{RAG_GROUNDEDNESS_PROMPT, RAG_HELPFULNESS_PROMPT};
    use crate::suite::{RagCase, RagSuite};

    /// helpfulness approves, groundedness dissents: the average lands
    /// at exactly 0.5.
    async fn split_verdict_report() -> RunReport {
        let helpfulness = LlmAsJudge::with_judge(
            RAG_HELPFULNESS_PROMPT,
            "helpfulness",
            Arc::new(CannedJudge::approving()),
        )
        .unwrap();
        let groundedness = LlmAsJudge::with_judge(
            RAG_GROUNDEDNESS_PROMPT,
            "groundedness",
            Arc::new(CannedJudge::dissenting()),
        )
        .unwrap();
        let suite = RagSuite::builder()
            .evaluator(Arc::new(helpfulness))
            .evaluator(Arc::new(groundedness))
            .build()
            .unwrap();
        let case = RagCase {
            question: Some("What training does clause 6.2.5 require?".to_string()),
            answer: Some("Staff must hold IATA training.".to_string()),
            reference_answer: None,
            documents: Some(json!(["Staff must receive IATA training."])),
        };
        suite.run(&case).await.unwrap()
    }

    #[tokio::test]
    async fn average_gate_splits_on_the_threshold() {
        let report = split_verdict_report().await;

        assert_eq!(report.summary.avg_score, 0.5);
        assert!(assert_avg_score(&report, 0.4).is_ok());
        assert!(assert_avg_score(&report, 0.6).is_err());
    }

    #[tokio::test]
    async fn dissent_fails_the_per_metric_gate() {
        let report = split_verdict_report().await;

        assert!(assert_min_score(&report, 0.1).is_err());
        assert_eq!(report.results[1].key, "groundedness");
        assert_eq!(
            report.results[1].comment.as_deref(),
            Some("does not meet the rubric")
        );
    }
}


