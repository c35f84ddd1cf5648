//! OpenAI-compatible chat completions.
//!
//! Messages are plain `{role, content}` JSON objects. [`structured`] asks the model for a JSON
//! object and re-asks when the reply does not parse; [`complete`] returns the raw text.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const STRUCTURED_ATTEMPTS: usize = 3;

pub async fn complete(cfg: &landlaw_config::LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	choice_content(&json).map(str::to_string).ok_or_else(|| Error::InvalidResponse {
		message: "Chat response is missing message content.".to_string(),
	})
}

pub async fn structured(
	cfg: &landlaw_config::LlmProviderConfig,
	messages: &[Value],
	schema_name: &str,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for attempt in 1..=STRUCTURED_ATTEMPTS {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
			"response_format": { "type": "json_object" },
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_structured_json(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				tracing::warn!(schema = schema_name, attempt, error = %err, "Structured output did not parse.");
			},
		}
	}

	Err(Error::InvalidResponse {
		message: format!("Structured output {schema_name} is not valid JSON."),
	})
}

fn choice_content(json: &Value) -> Option<&str> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
}

fn parse_structured_json(json: Value) -> Result<Value> {
	if let Some(content) = choice_content(&json) {
		let parsed: Value = serde_json::from_str(strip_code_fence(content))?;

		if !parsed.is_object() {
			return Err(Error::InvalidResponse {
				message: "Structured output must be a JSON object.".to_string(),
			});
		}

		return Ok(parsed);
	}

	Err(Error::InvalidResponse { message: "Chat response is missing JSON content.".to_string() })
}

// Some OpenAI-compatible servers wrap JSON mode output in a markdown fence.
fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}
