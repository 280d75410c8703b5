// Example: Running the whole pipeline offline
//
// Canned judges and a stub embedder stand in for live models, so this
// runs with no API key and no network. It is the same wiring the test
// suite uses, which makes it a good template for CI gates.
//
// To run from the workspace root:
//   cargo run -p ragjudge-core --example offline_suite

use std::sync::Arc;

use async_trait::async_trait;
use ragjudge_core::testing::{assert_min_score, CannedJudge};
use ragjudge_core::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Example 1: LLM metrics with a canned judge ===\n");
    run_canned_suite_example().await?;

    println!("\n=== Example 2: String evaluators ===\n");
    run_string_evaluator_example().await?;

    println!("\n=== Example 3: Embedding similarity ===\n");
    run_embedding_example().await?;

    Ok(())
}

// Example 1: the four LLM metrics over one case, judged deterministically
async fn run_canned_suite_example() -> anyhow::Result<()> {
    let case = RagCase {
        question: Some("What training does clause 6.2.5 require?".to_string()),
        answer: Some("Staff handling specimens must receive IATA training.".to_string()),
        reference_answer: Some("Staff must receive IATA training.".to_string()),
        documents: Some(json!({
            "clauses": [{"id": "6.2.5", "text": "Staff must receive IATA training."}]
        })),
    };

    let judge = Arc::new(CannedJudge::approving());
    let suite = RagSuite::builder()
        .evaluator(Arc::new(LlmAsJudge::with_judge(
            CORRECTNESS_PROMPT,
            "correctness",
            judge.clone(),
        )?))
        .evaluator(Arc::new(LlmAsJudge::with_judge(
            RAG_HELPFULNESS_PROMPT,
            "helpfulness",
            judge.clone(),
        )?))
        .evaluator(Arc::new(LlmAsJudge::with_judge(
            RAG_RETRIEVAL_RELEVANCE_PROMPT,
            "retrieval_relevance",
            judge.clone(),
        )?))
        .evaluator(Arc::new(LlmAsJudge::with_judge(
            RAG_GROUNDEDNESS_PROMPT,
            "groundedness",
            judge,
        )?))
        .build()?;

    let report = suite.run(&case).await?;
    println!("{}", report.summary_table());

    // Gate the way a CI test would
    assert_min_score(&report, 0.9)?;
    println!("all metrics at 0.9 or better");
    Ok(())
}

// Example 2: no judge at all, plain string comparison
async fn run_string_evaluator_example() -> anyhow::Result<()> {
    let request = EvalRequest::new()
        .outputs("Specimens are retained for one month.")
        .reference_outputs("Specimens are retained for four weeks.");

    let exact = ExactMatchEvaluator.evaluate(&request).await?;
    println!("{}: {}", exact.key, exact.score);

    let close = LevenshteinEvaluator.evaluate(&request).await?;
    println!("{}: {}", close.key, close.score);
    Ok(())
}

// Example 3: semantic similarity under an injected embedding backend
async fn run_embedding_example() -> anyhow::Result<()> {
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f64>, EvalError> {
            // A real backend would call an embeddings endpoint here
            let text = text.to_lowercase();
            Ok(vec![
                text.contains("retained") as u8 as f64,
                text.contains("month") as u8 as f64,
                text.contains("weeks") as u8 as f64,
            ])
        }
    }

    let evaluator = EmbeddingSimilarityEvaluator::new(Arc::new(KeywordEmbedder));
    let request = EvalRequest::new()
        .outputs("Specimens are retained for one month.")
        .reference_outputs("Specimens are retained for four weeks.");

    let result = evaluator.evaluate(&request).await?;
    println!("{}: {}", result.key, result.score);
    Ok(())
}
