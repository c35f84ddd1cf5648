use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub async fn embed(
	cfg: &landlaw_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding provider returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != cfg.dimensions as usize) {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding dimension mismatch. Expected {}, got {}.",
				cfg.dimensions,
				vector.len()
			),
		});
	}

	Ok(vectors)
}

pub async fn embed_one(
	cfg: &landlaw_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let mut vectors = embed(cfg, &[text.to_string()]).await?;

	vectors.pop().ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response is empty.".to_string(),
	})
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
