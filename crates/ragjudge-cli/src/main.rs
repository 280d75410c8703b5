use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ragjudge_core::{
	create_llm_as_judge, load_reference, Evaluator, JudgePrompt, RagCase, RagSuite, SuiteConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ragjudge", about = "Judge RAG pipeline outputs with LLM evaluators")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	Run(RunArgs),
}

#[derive(Debug, Clone, Parser)]
struct RunArgs {
	/// YAML suite config. Flags below override its fields.
	#[arg(long)]
	config: Option<PathBuf>,

	/// JSON case file: { "question"?, "answer"?, "reference_answer"?, "documents"? }
	#[arg(long)]
	case: Option<PathBuf>,

	/// JSON reference document, loaded into the case's documents slot
	#[arg(long)]
	reference: Option<PathBuf>,

	/// Comma-separated metrics: correctness, helpfulness, retrieval_relevance,
	/// groundedness. Defaults to all four.
	#[arg(long, value_delimiter = ',')]
	metrics: Vec<String>,

	/// Judge model, provider-qualified (e.g. openai:o3-mini)
	#[arg(long)]
	model: Option<String>,

	/// Ask the judge for 0-1 float scores instead of true/false verdicts
	#[arg(long, action = ArgAction::SetTrue)]
	continuous: bool,

	/// Output JSON report to a file
	#[arg(long)]
	json_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "ragjudge=warn,ragjudge_core=warn".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let cli = Cli::parse();
	match cli.command {
		Commands::Run(args) => run(args).await?,
	}
	Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
	let mut config = match &args.config {
		Some(path) => SuiteConfig::load(path).await?,
		None => SuiteConfig {
			model: "openai:o3-mini".to_string(),
			metrics: Vec::new(),
			case: RagCase::default(),
			reference: None,
			continuous: false,
		},
	};

	// Flags override the config file
	if let Some(path) = &args.case {
		let value = load_reference(path).await?;
		config.case = serde_json::from_value(value)
			.with_context(|| format!("case file {} has an unexpected shape", path.display()))?;
	}
	if let Some(path) = args.reference {
		config.reference = Some(path);
	}
	if !args.metrics.is_empty() {
		config.metrics = args.metrics.clone();
	}
	if let Some(model) = args.model {
		config.model = model;
	}
	if args.continuous {
		config.continuous = true;
	}
	if config.metrics.is_empty() {
		config.metrics = vec![
			"correctness".to_string(),
			"helpfulness".to_string(),
			"retrieval_relevance".to_string(),
			"groundedness".to_string(),
		];
	}

	if let Some(path) = &config.reference {
		config.case.documents = Some(load_reference(path).await?);
	}

	let mut evaluators: Vec<Arc<dyn Evaluator>> = Vec::new();
	for metric in &config.metrics {
		let prompt = JudgePrompt::builtin(metric)?;
		let mut evaluator = create_llm_as_judge(prompt.template(), metric, &config.model)?;
		if config.continuous {
			evaluator = evaluator.continuous();
		}
		evaluators.push(Arc::new(evaluator));
	}

	let suite = RagSuite::builder().evaluators(evaluators).build()?;
	let report = suite.run(&config.case).await?;
	println!("{}", report.summary_table());

	if let Some(path) = args.json_out {
		let json = serde_json::to_string_pretty(&report)?;
		tokio::fs::write(path, json).await?;
	}

	Ok(())
}


