use std::{path::PathBuf, sync::Arc};

use clap::Parser;

use landlaw_domain::Message;
use landlaw_service::{
	DefaultChatModel, PostgresCheckpointer, Providers, QdrantSearch, RunConfig, RunInput, Workflow,
};
use landlaw_storage::{db::Db, qdrant::QdrantStore};

/// Asks one land-law question and prints the answer with the documents it was grounded on.
#[derive(Debug, Parser)]
#[command(
	version = landlaw_cli::VERSION,
	rename_all = "kebab",
	styles = landlaw_cli::styles(),
)]
struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	config: PathBuf,
	#[arg(long, short = 'q', value_name = "TEXT")]
	question: String,
	/// Continue a persisted conversation. Requires Postgres.
	#[arg(long, value_name = "ID")]
	thread_id: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();
	let config = landlaw_config::load(&args.config)?;

	landlaw_cli::init_tracing(&config.service.log_level);

	let qdrant = QdrantStore::new(&config.storage.qdrant)?;
	let search = QdrantSearch::new(qdrant, config.providers.embedding.clone());
	let mut workflow = Workflow::new(Providers::new(Arc::new(DefaultChatModel), Arc::new(search)));
	let mut run_config = RunConfig::from_config(&config);

	if let Some(thread_id) = args.thread_id {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		workflow = workflow.with_checkpointer(Arc::new(PostgresCheckpointer::new(db)));
		run_config = run_config.with_thread_id(thread_id);
	}

	let state = workflow
		.invoke(RunInput { messages: vec![Message::human(args.question)] }, &run_config)
		.await?;

	tracing::info!(loop_step = state.loop_step, documents = state.documents.len(), "Run finished.");

	println!("{}", state.answer);

	let documents = state.ranked_documents();

	if !documents.is_empty() {
		println!();
		println!("Tài liệu tham khảo:");

		for doc in &documents {
			let score = doc.score().map(|score| format!("{score:.3}")).unwrap_or_else(|| "-".to_string());
			let label = if doc.title().is_empty() { doc.id.as_str() } else { doc.title() };

			println!("- [{score}] {label} ({})", doc.source());
		}
	}

	Ok(())
}
