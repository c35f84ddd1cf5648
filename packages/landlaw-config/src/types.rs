use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub workflow: Workflow,
	#[serde(default)]
	pub generation: Generation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Classification, routing, decomposition, grading and query rewriting.
	pub query_llm: LlmProviderConfig,
	/// Final answers and the map/reduce synthesis calls.
	pub response_llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Result limit for a plain single-query search.
	pub limit: u32,
	/// 0.0 is pure BM25, 1.0 is pure dense similarity.
	pub alpha: f32,
	pub docs_per_sub_query: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { limit: 6, alpha: 0.5, docs_per_sub_query: 4 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Workflow {
	pub max_retries: u32,
	pub max_sub_queries: u32,
	pub score_threshold: f32,
	pub min_documents: u32,
	pub llm_grading: bool,
}
impl Default for Workflow {
	fn default() -> Self {
		Self {
			max_retries: 2,
			max_sub_queries: 3,
			score_threshold: 0.5,
			min_documents: 2,
			llm_grading: false,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Generation {
	pub map_reduce_doc_threshold: u32,
	pub max_context_tokens: u32,
	pub large_doc_token_threshold: u32,
	/// Vietnamese text averages roughly 2.5 characters per model token.
	pub chars_per_token: f32,
	pub history_turns: u32,
}
impl Default for Generation {
	fn default() -> Self {
		Self {
			map_reduce_doc_threshold: 6,
			max_context_tokens: 8_000,
			large_doc_token_threshold: 2_000,
			chars_per_token: 2.5,
			history_turns: 3,
		}
	}
}
