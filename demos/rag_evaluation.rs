// Example: Judging one RAG exchange with the four built-in metrics
//
// This is the whole harness end to end: correctness, helpfulness,
// retrieval relevance and groundedness, each judged by openai:o3-mini.
// Replace the inputs, outputs and context with your own data.
//
// Setup:
// 1. Set your API key:
//    export OPENAI_API_KEY="sk-..."
//
// 2. Run from the workspace root:
//    cargo run -p ragjudge-core --example rag_evaluation

use ragjudge_core::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check API key is set
    std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY environment variable not set");

    // Load the standard the answer under test was retrieved from
    let standard_context = load_reference("demos/standard.json").await?;

    println!("Judging one RAG exchange with openai:o3-mini\n");

    // Correctness: does the answer agree with the ground-truth answer?
    let correctness = create_llm_as_judge(CORRECTNESS_PROMPT, "correctness", "openai:o3-mini")?;
    let result = correctness
        .evaluate(
            &EvalRequest::new()
                .inputs("Does the finding comply with clause 6.2.5 about IATA training for pathology specimen handling?")
                .outputs("The laboratory must ensure staff responsible for packaging and transport of pathology specimens receive IATA training.")
                .reference_outputs("The laboratory is required to ensure all staff involved in packaging and transporting pathology specimens are trained in IATA regulations."),
        )
        .await?;
    print_result(&result);

    // Helpfulness: does the answer actually address the question?
    let helpfulness =
        create_llm_as_judge(RAG_HELPFULNESS_PROMPT, "helpfulness", "openai:o3-mini")?;
    let result = helpfulness
        .evaluate(
            &EvalRequest::new()
                .inputs(json!({
                    "question": "What is required for staff handling pathology specimen packaging and transport?"
                }))
                .outputs(json!({
                    "answer": "The laboratory must ensure staff responsible for packaging and transport of pathology specimens receive IATA training."
                })),
        )
        .await?;
    print_result(&result);

    // Retrieval relevance: did retrieval surface documents that matter?
    let retrieval_relevance = create_llm_as_judge(
        RAG_RETRIEVAL_RELEVANCE_PROMPT,
        "retrieval_relevance",
        "openai:o3-mini",
    )?;
    let result = retrieval_relevance
        .evaluate(
            &EvalRequest::new()
                .inputs(json!({
                    "question": "What does clause 6.2.5 say about staff training?"
                }))
                .context(json!({ "documents": standard_context })),
        )
        .await?;
    print_result(&result);

    // Groundedness: is every claim in the answer supported by the documents?
    let groundedness =
        create_llm_as_judge(RAG_GROUNDEDNESS_PROMPT, "groundedness", "openai:o3-mini")?;
    let result = groundedness
        .evaluate(
            &EvalRequest::new()
                .context(json!({ "documents": standard_context }))
                .outputs(json!({
                    "answer": "The laboratory must ensure staff responsible for packaging and transport of pathology specimens receive IATA training."
                })),
        )
        .await?;
    print_result(&result);

    Ok(())
}

fn print_result(result: &EvaluatorResult) {
    println!("{}: {}", result.key, result.score);
    if let Some(comment) = &result.comment {
        println!("  {comment}");
    }
    println!();
}
