use std::sync::Arc;

use landlaw_service::{
	DefaultChatModel, PostgresCheckpointer, Providers, QdrantSearch, RunConfig, Workflow,
};
use landlaw_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub workflow: Arc<Workflow>,
	pub run_config: Arc<RunConfig>,
}
impl AppState {
	pub async fn new(config: landlaw_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let search = QdrantSearch::new(qdrant, config.providers.embedding.clone());
		let providers = Providers::new(Arc::new(DefaultChatModel), Arc::new(search));
		let workflow =
			Workflow::new(providers).with_checkpointer(Arc::new(PostgresCheckpointer::new(db)));

		Ok(Self::from_parts(workflow, RunConfig::from_config(&config)))
	}

	pub fn from_parts(workflow: Workflow, run_config: RunConfig) -> Self {
		Self { workflow: Arc::new(workflow), run_config: Arc::new(run_config) }
	}
}
