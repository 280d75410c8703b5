use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use ragjudge_types::{Score, TokenUsage};

use crate::error::EvalError;

/// Score shape requested from the judge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreKind {
    /// A plain true/false verdict.
    #[default]
    Boolean,
    /// A float in [0, 1].
    Continuous,
}

/// One rendered prompt headed for a judge model.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub prompt: String,
    pub score_kind: ScoreKind,
}

/// A parsed judge verdict.
#[derive(Debug, Clone)]
pub struct JudgeReply {
    pub score: Score,
    pub comment: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// The model boundary. An implementation talks to exactly one judge
/// model; everything above this trait is deterministic, so tests swap
/// in canned replies instead of a live endpoint.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn score(&self, request: &JudgeRequest) -> Result<JudgeReply, EvalError>;
    fn model_name(&self) -> &str;
}

/// Judge backed by the OpenAI chat completions API.
pub struct OpenAiJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiJudge {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, EvalError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| EvalError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key, model))
    }

    /// Point the client somewhere else: a proxy, a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<JudgeReply, EvalError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert evaluator. Respond only with valid JSON."
                },
                {
                    "role": "user",
                    "content": request.prompt
                }
            ],
            "temperature": 0.0,
            "response_format": { "type": "json_object" }
        });

        debug!(model = %self.model, "sending judge request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| EvalError::Transient(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(%status, "judge endpoint unavailable");
                return Err(EvalError::Transient(format!("{status}: {error_text}")));
            }
            return Err(EvalError::Judge(format!("{status}: {error_text}")));
        }

        let response_data: Value = response
            .json()
            .await
            .map_err(|err| EvalError::Judge(format!("unreadable reply body: {err}")))?;

        let content = response_data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| EvalError::Judge("reply carries no message content".to_string()))?;

        let (score, comment) = parse_verdict(content, request.score_kind)?;

        let usage = response_data
            .get("usage")
            .and_then(Value::as_object)
            .map(|u| TokenUsage {
                input_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
                output_tokens: u.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0)
                    as u32,
                total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            });

        Ok(JudgeReply { score, comment, usage })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pull `score` and `reasoning` out of the judge's reply text.
///
/// Strict JSON first; if the model wrapped its JSON in prose, fall back
/// to the outermost brace-delimited slice.
fn parse_verdict(content: &str, kind: ScoreKind) -> Result<(Score, Option<String>), EvalError> {
    let parsed = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(_) => extract_embedded_json(content)
            .ok_or_else(|| EvalError::Judge(format!("reply is not JSON: {}", preview(content))))?,
    };

    let raw_score = parsed
        .get("score")
        .ok_or_else(|| EvalError::Judge("reply carries no `score`".to_string()))?;

    let score = match kind {
        ScoreKind::Boolean => match raw_score {
            Value::Bool(b) => Score::Bool(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Score::Bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Score::Bool(false),
            other => {
                return Err(EvalError::Judge(format!(
                    "expected a boolean score, got {other}"
                )))
            }
        },
        ScoreKind::Continuous => match raw_score.as_f64() {
            Some(v) => Score::Float(v.clamp(0.0, 1.0)),
            None => {
                return Err(EvalError::Judge(format!(
                    "expected a numeric score, got {raw_score}"
                )))
            }
        },
    };

    let comment = parsed
        .get("reasoning")
        .or_else(|| parsed.get("comment"))
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    Ok((score, comment))
}

fn extract_embedded_json(content: &str) -> Option<Value> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}

fn preview(content: &str) -> String {
    content.chars().take(120).collect()
}
