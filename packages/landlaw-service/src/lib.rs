pub mod checkpoint;
pub mod config;
pub mod graph;
pub mod map_reduce;
pub mod nodes;
pub mod prompts;
pub mod search;
pub mod state;
pub mod structured;

mod error;

pub use checkpoint::{Checkpoint, MemoryCheckpointer, PostgresCheckpointer};
pub use config::{RunConfig, RunOverrides};
pub use error::{Error, Result};
pub use graph::{Node, RunInput, Workflow};
pub use search::{QdrantSearch, SearchOptions};
pub use state::{AgentState, StateUpdate};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use landlaw_config::LlmProviderConfig;
use landlaw_domain::Document;
use landlaw_providers::chat;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Language-model capability shared by every node.
pub trait ChatModel
where
	Self: Send + Sync,
{
	/// Returns a JSON object shaped like the named output schema.
	fn structured<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		schema_name: &'a str,
	) -> BoxFuture<'a, Result<Value>>;

	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

pub trait SearchEngine
where
	Self: Send + Sync,
{
	/// Every returned document carries a `score` in its metadata.
	fn hybrid_search<'a>(
		&'a self,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, Result<Vec<Document>>>;
}

pub trait Checkpointer
where
	Self: Send + Sync,
{
	/// Latest checkpoint for the thread, if any.
	fn load<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, Result<Option<Checkpoint>>>;

	fn save<'a>(&'a self, checkpoint: &'a Checkpoint) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub chat: Arc<dyn ChatModel>,
	pub search: Arc<dyn SearchEngine>,
}
impl Providers {
	pub fn new(chat: Arc<dyn ChatModel>, search: Arc<dyn SearchEngine>) -> Self {
		Self { chat, search }
	}
}

/// OpenAI-compatible chat completions over HTTP.
pub struct DefaultChatModel;
impl ChatModel for DefaultChatModel {
	fn structured<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		schema_name: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(chat::structured(cfg, messages, schema_name).await?) })
	}

	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(chat::complete(cfg, messages).await?) })
	}
}
