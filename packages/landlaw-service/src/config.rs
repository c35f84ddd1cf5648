use serde::Deserialize;

use landlaw_config::{Config, Generation, LlmProviderConfig, Search, Workflow};
use landlaw_domain::{MetadataFilters, strategy::StrategyThresholds};

use crate::Result;

/// Everything a single run reads. Built once from the file config, then narrowed per request.
#[derive(Debug, Clone)]
pub struct RunConfig {
	pub query_llm: LlmProviderConfig,
	pub response_llm: LlmProviderConfig,
	pub search: Search,
	pub workflow: Workflow,
	pub generation: Generation,
	pub filters: MetadataFilters,
	pub thread_id: Option<String>,
}
impl RunConfig {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			query_llm: cfg.providers.query_llm.clone(),
			response_llm: cfg.providers.response_llm.clone(),
			search: cfg.search.clone(),
			workflow: cfg.workflow.clone(),
			generation: cfg.generation.clone(),
			filters: MetadataFilters::default(),
			thread_id: None,
		}
	}

	pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
		self.thread_id = Some(thread_id.into());

		self
	}

	/// Applies request overrides and re-validates the touched sections with the config file rules.
	pub fn with_overrides(mut self, overrides: &RunOverrides) -> Result<Self> {
		if let Some(max_retries) = overrides.max_retries {
			self.workflow.max_retries = max_retries;
		}
		if let Some(score_threshold) = overrides.score_threshold {
			self.workflow.score_threshold = score_threshold;
		}
		if let Some(min_documents) = overrides.min_documents {
			self.workflow.min_documents = min_documents;
		}
		if let Some(max_sub_queries) = overrides.max_sub_queries {
			self.workflow.max_sub_queries = max_sub_queries;
		}
		if let Some(docs_per_sub_query) = overrides.docs_per_sub_query {
			self.search.docs_per_sub_query = docs_per_sub_query;
		}
		if let Some(alpha) = overrides.alpha {
			self.search.alpha = alpha;
		}
		if let Some(filters) = overrides.filters.clone() {
			self.filters = filters;
		}
		if let Some(model) = overrides.query_model.as_deref() {
			self.query_llm.model = model.trim().to_string();
		}
		if let Some(temperature) = overrides.query_temperature {
			self.query_llm.temperature = temperature;
		}
		if let Some(model) = overrides.response_model.as_deref() {
			self.response_llm.model = model.trim().to_string();
		}
		if let Some(temperature) = overrides.response_temperature {
			self.response_llm.temperature = temperature;
		}

		landlaw_config::validate_llm("query_llm", &self.query_llm)?;
		landlaw_config::validate_llm("response_llm", &self.response_llm)?;
		landlaw_config::validate_search(&self.search)?;
		landlaw_config::validate_workflow(&self.workflow)?;

		Ok(self)
	}

	pub fn strategy_thresholds(&self) -> StrategyThresholds {
		StrategyThresholds::from(&self.generation)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunOverrides {
	pub max_retries: Option<u32>,
	pub score_threshold: Option<f32>,
	pub min_documents: Option<u32>,
	pub max_sub_queries: Option<u32>,
	pub docs_per_sub_query: Option<u32>,
	pub alpha: Option<f32>,
	pub filters: Option<MetadataFilters>,
	/// Model id on the configured query provider.
	pub query_model: Option<String>,
	pub query_temperature: Option<f32>,
	/// Model id on the configured response provider.
	pub response_model: Option<String>,
	pub response_temperature: Option<f32>,
}
