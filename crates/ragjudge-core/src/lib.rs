//! ragjudge-core: LLM-as-judge evaluation SDK for RAG pipelines.
//! Build evaluators from prebuilt judge prompts, feed them request
//! bundles, get keyed scores back; compose them into suites.
//! See `demos/rag_evaluation.rs` for a quickstart.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod judge;
pub mod prompts;
pub mod reference;
pub mod request;
pub mod suite;
pub mod testing;

pub mod evaluators {
    pub mod embedding;
    pub mod string;
}

pub use config::SuiteConfig;
pub use error::EvalError;
pub use evaluator::{create_llm_as_judge, Evaluator, LlmAsJudge};
pub use evaluators::{
    embedding::{Embedder, EmbeddingSimilarityEvaluator},
    string::{ExactMatchEvaluator, LevenshteinEvaluator},
};
pub use judge::{Judge, JudgeReply, JudgeRequest, OpenAiJudge, ScoreKind};
pub use prompts::{
    JudgePrompt, CORRECTNESS_PROMPT, RAG_GROUNDEDNESS_PROMPT, RAG_HELPFULNESS_PROMPT,
    RAG_RETRIEVAL_RELEVANCE_PROMPT,
};
pub use reference::load_reference;
pub use request::{EvalRequest, Field};
pub use suite::{RagCase, RagSuite, RagSuiteBuilder};

pub use ragjudge_types::{EvaluatorResult, RunReport, RunSummary, Score, TokenUsage};
