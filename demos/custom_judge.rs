// Example: Plugging your own judge backend into ragjudge
//
// The built-in OpenAiJudge speaks raw HTTP. If your project already
// holds an async-openai client (or any other LLM client), implement
// the Judge trait once and every evaluator can run on top of it.
//
// Setup:
// 1. Add to your Cargo.toml:
//    async-openai = "0.23"
//    async-trait = "0.1"
//    tokio = { version = "1", features = ["full"] }
//    ragjudge-core = { path = "../crates/ragjudge-core" }
//
// 2. Set your API key:
//    export OPENAI_API_KEY="sk-..."
//
// 3. Run from the workspace root:
//    cargo run -p ragjudge-core --example custom_judge

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use ragjudge_core::*;
use serde_json::json;
use std::sync::Arc;

/// A judge backed by the async-openai SDK instead of the built-in
/// reqwest client.
struct SdkJudge {
    client: Client<OpenAIConfig>,
    model: String,
}

impl SdkJudge {
    fn new(model: &str) -> Self {
        Self {
            client: Client::new(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Judge for SdkJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<JudgeReply, EvalError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are an expert evaluator. Respond only with valid JSON.")
                    .build()
                    .map_err(|err| EvalError::Judge(err.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt.as_str())
                    .build()
                    .map_err(|err| EvalError::Judge(err.to_string()))?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(0.0) // Deterministic for judging
            .build()
            .map_err(|err| EvalError::Judge(err.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|err| EvalError::Transient(err.to_string()))?;

        let content = response.choices[0]
            .message
            .content
            .clone()
            .unwrap_or_default();

        let verdict: serde_json::Value = serde_json::from_str(&content)
            .map_err(|err| EvalError::Judge(format!("reply is not JSON: {err}")))?;

        let score = match request.score_kind {
            ScoreKind::Boolean => {
                let passed = verdict["score"]
                    .as_bool()
                    .ok_or_else(|| EvalError::Judge("reply carries no boolean `score`".to_string()))?;
                Score::Bool(passed)
            }
            ScoreKind::Continuous => {
                let value = verdict["score"]
                    .as_f64()
                    .ok_or_else(|| EvalError::Judge("reply carries no numeric `score`".to_string()))?;
                Score::Float(value.clamp(0.0, 1.0))
            }
        };
        let comment = verdict["reasoning"].as_str().map(|s| s.to_string());

        let usage = response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(JudgeReply { score, comment, usage })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check API key is set; Client::new() reads it from the environment
    std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY environment variable not set");

    let judge = Arc::new(SdkJudge::new("gpt-4o-mini"));

    // Boolean verdict: is the answer grounded in the documents?
    let groundedness =
        LlmAsJudge::with_judge(RAG_GROUNDEDNESS_PROMPT, "groundedness", judge.clone())?;
    let result = groundedness
        .evaluate(
            &EvalRequest::new()
                .context(json!({
                    "documents": [
                        {"id": "6.2.5", "text": "Staff must receive IATA training."}
                    ]
                }))
                .outputs("Staff handling specimens must receive IATA training."),
        )
        .await?;
    println!("{}: {}", result.key, result.score);
    if let Some(comment) = &result.comment {
        println!("  {comment}");
    }

    // The same judge with a continuous score instead of a verdict
    let helpfulness = LlmAsJudge::with_judge(RAG_HELPFULNESS_PROMPT, "helpfulness", judge)?
        .continuous();
    let result = helpfulness
        .evaluate(
            &EvalRequest::new()
                .inputs("What training do specimen handlers need?")
                .outputs("Staff handling specimens must receive IATA training."),
        )
        .await?;
    println!("\n{}: {}", result.key, result.score);
    if let Some(usage) = result.metadata.as_ref().and_then(|m| m.get("usage")) {
        println!("  tokens: {usage}");
    }

    Ok(())
}
