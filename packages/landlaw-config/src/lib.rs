mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Generation, LlmProviderConfig, Postgres, Providers, Qdrant,
	Search, Service, Storage, Workflow,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, provider_id, api_base, api_key, model) in [
		(
			"embedding",
			&cfg.providers.embedding.provider_id,
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.api_key,
			&cfg.providers.embedding.model,
		),
		(
			"query_llm",
			&cfg.providers.query_llm.provider_id,
			&cfg.providers.query_llm.api_base,
			&cfg.providers.query_llm.api_key,
			&cfg.providers.query_llm.model,
		),
		(
			"response_llm",
			&cfg.providers.response_llm.provider_id,
			&cfg.providers.response_llm.api_base,
			&cfg.providers.response_llm.api_key,
			&cfg.providers.response_llm.model,
		),
	] {
		if provider_id.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} provider_id must be non-empty."),
			});
		}
		if model.trim().is_empty() || model.chars().any(char::is_whitespace) {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be a non-empty model id."),
			});
		}
		if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be an http(s) URL."),
			});
		}
		if api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	validate_llm("query_llm", &cfg.providers.query_llm)?;
	validate_llm("response_llm", &cfg.providers.response_llm)?;
	validate_search(&cfg.search)?;
	validate_workflow(&cfg.workflow)?;
	validate_generation(&cfg.generation)?;

	Ok(())
}

/// Model id and sampling checks for a chat provider. Also applied to per-run model overrides.
pub fn validate_llm(label: &str, llm: &LlmProviderConfig) -> Result<()> {
	if llm.model.trim().is_empty() || llm.model.chars().any(char::is_whitespace) {
		return Err(Error::Validation {
			message: format!("Provider {label} model must be a non-empty model id."),
		});
	}
	if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: format!("Provider {label} temperature must be in the range 0.0-2.0."),
		});
	}

	Ok(())
}

pub fn validate_search(search: &Search) -> Result<()> {
	if search.limit == 0 {
		return Err(Error::Validation {
			message: "search.limit must be greater than zero.".to_string(),
		});
	}
	if !search.alpha.is_finite() || !(0.0..=1.0).contains(&search.alpha) {
		return Err(Error::Validation {
			message: "search.alpha must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !(2..=10).contains(&search.docs_per_sub_query) {
		return Err(Error::Validation {
			message: "search.docs_per_sub_query must be in the range 2-10.".to_string(),
		});
	}

	Ok(())
}

pub fn validate_workflow(workflow: &Workflow) -> Result<()> {
	if workflow.max_retries > 5 {
		return Err(Error::Validation {
			message: "workflow.max_retries must be 5 or less.".to_string(),
		});
	}
	if !(2..=5).contains(&workflow.max_sub_queries) {
		return Err(Error::Validation {
			message: "workflow.max_sub_queries must be in the range 2-5.".to_string(),
		});
	}
	if !workflow.score_threshold.is_finite() || !(0.0..=1.0).contains(&workflow.score_threshold)
	{
		return Err(Error::Validation {
			message: "workflow.score_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

pub fn validate_generation(generation: &Generation) -> Result<()> {
	if generation.map_reduce_doc_threshold == 0 {
		return Err(Error::Validation {
			message: "generation.map_reduce_doc_threshold must be greater than zero.".to_string(),
		});
	}
	if generation.max_context_tokens == 0 {
		return Err(Error::Validation {
			message: "generation.max_context_tokens must be greater than zero.".to_string(),
		});
	}
	if generation.large_doc_token_threshold == 0 {
		return Err(Error::Validation {
			message: "generation.large_doc_token_threshold must be greater than zero.".to_string(),
		});
	}
	if !generation.chars_per_token.is_finite() || generation.chars_per_token <= 0.0 {
		return Err(Error::Validation {
			message: "generation.chars_per_token must be a positive number.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for api_base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.query_llm.api_base,
		&mut cfg.providers.response_llm.api_base,
	] {
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}

	cfg.providers.query_llm.model = cfg.providers.query_llm.model.trim().to_string();
	cfg.providers.response_llm.model = cfg.providers.response_llm.model.trim().to_string();
	cfg.providers.embedding.model = cfg.providers.embedding.model.trim().to_string();
}
