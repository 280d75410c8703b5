use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use ragjudge_types::EvaluatorResult;

use crate::error::EvalError;
use crate::judge::{Judge, JudgeRequest, OpenAiJudge, ScoreKind};
use crate::prompts::JudgePrompt;
use crate::request::{EvalRequest, Field};

/// Anything that can turn a request bundle into one scored result.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Label attached to every result this evaluator produces.
    fn feedback_key(&self) -> &str;

    /// Request fields this evaluator consumes, and the only fields it
    /// accepts.
    fn required_fields(&self) -> &[Field];

    async fn evaluate(&self, request: &EvalRequest) -> Result<EvaluatorResult, EvalError>;
}

/// Split a `provider:model` identifier.
fn parse_model(model: &str) -> Result<(&str, &str), EvalError> {
    match model.split_once(':') {
        Some((provider, name)) if !provider.is_empty() && !name.is_empty() => Ok((provider, name)),
        _ => Err(EvalError::Configuration(format!(
            "model identifier `{model}` is not of the form provider:model"
        ))),
    }
}

/// Bind a prompt template, a feedback key and a judge model into a
/// reusable evaluator. Construction is pure configuration: nothing
/// leaves the process until [`LlmAsJudge::evaluate`] runs.
///
/// `model` is provider-qualified, e.g. `"openai:o3-mini"`. The provider
/// must be `openai` with `OPENAI_API_KEY` set; any other backend plugs
/// in through [`LlmAsJudge::with_judge`].
pub fn create_llm_as_judge(
    prompt: &str,
    feedback_key: &str,
    model: &str,
) -> Result<LlmAsJudge, EvalError> {
    let (provider, model_name) = parse_model(model)?;
    let judge: Arc<dyn Judge> = match provider {
        "openai" => Arc::new(OpenAiJudge::from_env(model_name)?),
        other => {
            return Err(EvalError::Configuration(format!(
                "unknown judge provider `{other}` in `{model}`"
            )))
        }
    };
    LlmAsJudge::with_judge(prompt, feedback_key, judge)
}

/// An LLM-as-judge evaluator: one prompt, one feedback key, one judge.
///
/// Holds no state between calls. Equal requests through the same judge
/// behave identically, and a request is never mutated.
pub struct LlmAsJudge {
    prompt: JudgePrompt,
    feedback_key: String,
    judge: Arc<dyn Judge>,
    score_kind: ScoreKind,
}

impl LlmAsJudge {
    /// Bind against a caller-supplied judge. This is the seam tests use
    /// to run the full pipeline against a deterministic stub.
    pub fn with_judge(
        prompt: &str,
        feedback_key: &str,
        judge: Arc<dyn Judge>,
    ) -> Result<Self, EvalError> {
        Ok(Self {
            prompt: JudgePrompt::new(feedback_key, prompt)?,
            feedback_key: feedback_key.to_string(),
            judge,
            score_kind: ScoreKind::Boolean,
        })
    }

    /// Ask the judge for a float in [0, 1] instead of a verdict.
    pub fn continuous(mut self) -> Self {
        self.score_kind = ScoreKind::Continuous;
        self
    }
}

// The judge is a trait object, so Debug is spelled out by hand.
impl fmt::Debug for LlmAsJudge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmAsJudge")
            .field("feedback_key", &self.feedback_key)
            .field("fields", &self.prompt.fields())
            .field("model", &self.judge.model_name())
            .field("score_kind", &self.score_kind)
            .finish()
    }
}

#[async_trait]
impl Evaluator for LlmAsJudge {
    fn feedback_key(&self) -> &str {
        &self.feedback_key
    }

    fn required_fields(&self) -> &[Field] {
        self.prompt.fields()
    }

    async fn evaluate(&self, request: &EvalRequest) -> Result<EvaluatorResult, EvalError> {
        self.prompt.check_fields(&self.feedback_key, request)?;
        let rendered = self.prompt.render(request, self.score_kind)?;

        debug!(key = %self.feedback_key, model = %self.judge.model_name(), "invoking judge");
        let reply = self
            .judge
            .score(&JudgeRequest {
                prompt: rendered,
                score_kind: self.score_kind,
            })
            .await?;

        let mut metadata = json!({ "model": self.judge.model_name() });
        if let Some(usage) = reply.usage {
            metadata["usage"] = json!(usage);
        }

        let mut result = EvaluatorResult::new(&self.feedback_key, reply.score);
        result.comment = reply.comment;
        result.metadata = Some(metadata);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{
        CORRECTNESS_PROMPT, RAG_GROUNDEDNESS_PROMPT, RAG_HELPFULNESS_PROMPT,
        RAG_RETRIEVAL_RELEVANCE_PROMPT,
    };
    use crate::testing::{CannedJudge, RecordingJudge};
    use ragjudge_types::Score;
    use serde_json::json;

    fn canned() -> Arc<CannedJudge> {
        Arc::new(CannedJudge::approving())
    }

    fn full_request() -> EvalRequest {
        EvalRequest::new()
            .inputs("does the finding comply?")
            .outputs("the laboratory must retain specimens for one month")
            .reference_outputs("specimens are retained for four weeks")
            .context(json!({"documents": ["specimen retention is four weeks"]}))
    }

    fn keep(request: &EvalRequest, fields: &[Field]) -> EvalRequest {
        let mut kept = EvalRequest::new();
        for field in fields {
            match field {
                Field::Inputs => kept.inputs = request.inputs.clone(),
                Field::Outputs => kept.outputs = request.outputs.clone(),
                Field::ReferenceOutputs => {
                    kept.reference_outputs = request.reference_outputs.clone()
                }
                Field::Context => kept.context = request.context.clone(),
            }
        }
        kept
    }

    #[test]
    fn factory_rejects_bare_model_names() {
        let err = create_llm_as_judge(CORRECTNESS_PROMPT, "correctness", "o3-mini").unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
    }

    #[test]
    fn factory_rejects_unknown_providers() {
        let err =
            create_llm_as_judge(CORRECTNESS_PROMPT, "correctness", "bedrock:titan").unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
    }

    #[test]
    fn factory_rejects_placeholder_free_prompts() {
        let err = LlmAsJudge::with_judge("grade the answer", "custom", canned()).unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
    }

    #[test]
    fn debug_output_names_the_binding() {
        let evaluator =
            LlmAsJudge::with_judge(RAG_HELPFULNESS_PROMPT, "helpfulness", canned()).unwrap();
        let repr = format!("{evaluator:?}");
        assert!(repr.contains("helpfulness"));
        assert!(repr.contains("canned"));
        assert!(repr.contains("Inputs"));
    }

    #[tokio::test]
    async fn each_metric_takes_exactly_its_fields() {
        let metrics = [
            (CORRECTNESS_PROMPT, "correctness"),
            (RAG_HELPFULNESS_PROMPT, "helpfulness"),
            (RAG_RETRIEVAL_RELEVANCE_PROMPT, "retrieval_relevance"),
            (RAG_GROUNDEDNESS_PROMPT, "groundedness"),
        ];
        let full = full_request();

        for (prompt, key) in metrics {
            let evaluator = LlmAsJudge::with_judge(prompt, key, canned()).unwrap();
            let fields = evaluator.required_fields().to_vec();

            let exact = keep(&full, &fields);
            let result = evaluator.evaluate(&exact).await.unwrap();
            assert_eq!(result.key, key);

            for missing in &fields {
                let mut trimmed = fields.clone();
                trimmed.retain(|f| f != missing);
                let err = evaluator.evaluate(&keep(&full, &trimmed)).await.unwrap_err();
                assert!(
                    matches!(err, EvalError::MissingField { field, .. } if field == *missing),
                    "{key} should require {missing}"
                );
            }

            for extra in Field::ALL.iter().filter(|f| !fields.contains(f)) {
                let mut widened = fields.clone();
                widened.push(*extra);
                let err = evaluator.evaluate(&keep(&full, &widened)).await.unwrap_err();
                assert!(
                    matches!(err, EvalError::UnexpectedField { field, .. } if field == *extra),
                    "{key} should reject {extra}"
                );
            }
        }
    }

    #[tokio::test]
    async fn invocation_is_repeatable_and_leaves_the_request_alone() {
        let evaluator =
            LlmAsJudge::with_judge(RAG_HELPFULNESS_PROMPT, "helpfulness", canned()).unwrap();
        let request = EvalRequest::new()
            .inputs("how long are specimens retained?")
            .outputs("four weeks");
        let before = request.clone();

        let first = evaluator.evaluate(&request).await.unwrap();
        let second = evaluator.evaluate(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(request, before);
    }

    #[tokio::test]
    async fn result_carries_key_score_comment_and_model() {
        let judge = Arc::new(CannedJudge::new(
            Score::Bool(true),
            Some("supported by the documents"),
        ));
        let evaluator =
            LlmAsJudge::with_judge(RAG_GROUNDEDNESS_PROMPT, "groundedness", judge).unwrap();
        let request = EvalRequest::new()
            .outputs("staff must receive IATA training")
            .context(json!({"documents": {"clauses": [{"id": "6.2.5"}]}}));

        let result = evaluator.evaluate(&request).await.unwrap();
        assert_eq!(result.key, "groundedness");
        assert_eq!(result.score, Score::Bool(true));
        assert_eq!(result.comment.as_deref(), Some("supported by the documents"));
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata["model"], json!("canned"));
    }

    #[tokio::test]
    async fn judge_sees_the_interpolated_fields() {
        let judge = Arc::new(RecordingJudge::approving());
        let evaluator = LlmAsJudge::with_judge(
            RAG_GROUNDEDNESS_PROMPT,
            "groundedness",
            judge.clone(),
        )
        .unwrap();
        let request = EvalRequest::new()
            .outputs("Staff working with dangerous goods must receive IATA training.")
            .context(json!({
                "clauses": [{"id": "6.2.5", "text": "Staff must receive IATA training."}]
            }));

        evaluator.evaluate(&request).await.unwrap();

        let prompts = judge.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("IATA training"));
        assert!(prompts[0].contains("6.2.5"));
        assert!(prompts[0].contains(r#""score": true|false"#));
    }

    #[tokio::test]
    async fn continuous_mode_changes_the_asked_for_shape() {
        let judge = Arc::new(RecordingJudge::scoring(Score::Float(0.8)));
        let evaluator =
            LlmAsJudge::with_judge(RAG_HELPFULNESS_PROMPT, "helpfulness", judge.clone())
                .unwrap()
                .continuous();
        let request = EvalRequest::new().inputs("q").outputs("a");

        let result = evaluator.evaluate(&request).await.unwrap();
        assert_eq!(result.score, Score::Float(0.8));
        assert!(judge.prompts()[0].contains("between 0.0 and 1.0"));
    }
}
