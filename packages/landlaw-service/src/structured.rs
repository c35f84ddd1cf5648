//! Typed output contracts for structured model calls.
//!
//! Each node that needs structured output names a schema and a serde type; the model sees the
//! schema hint in its prompt and the reply is decoded into the type.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use landlaw_config::LlmProviderConfig;

use crate::{ChatModel, Error, Result};

pub trait StructuredOutput
where
	Self: DeserializeOwned,
{
	const NAME: &'static str;

	fn schema() -> Value;
}

pub async fn request<T>(chat: &dyn ChatModel, cfg: &LlmProviderConfig, messages: &[Value]) -> Result<T>
where
	T: StructuredOutput,
{
	let raw = chat.structured(cfg, messages, T::NAME).await?;

	serde_json::from_value(raw).map_err(|err| Error::Provider {
		message: format!("Structured output {} does not match its schema: {err}.", T::NAME),
	})
}

#[derive(Debug, Clone, Deserialize)]
pub struct LandLawRelevance {
	pub is_related_to_land_law: bool,
	#[serde(default)]
	pub reasoning: String,
}
impl StructuredOutput for LandLawRelevance {
	const NAME: &'static str = "check_land_law_relevance";

	fn schema() -> Value {
		serde_json::json!({ "is_related_to_land_law": "boolean", "reasoning": "string" })
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteDecision {
	pub is_complex: bool,
	#[serde(default)]
	pub reasoning: String,
}
impl StructuredOutput for RouteDecision {
	const NAME: &'static str = "route_query_complexity";

	fn schema() -> Value {
		serde_json::json!({ "is_complex": "boolean", "reasoning": "string" })
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Decomposition {
	#[serde(default)]
	pub sub_queries: Vec<String>,
}
impl StructuredOutput for Decomposition {
	const NAME: &'static str = "decompose_query";

	fn schema() -> Value {
		serde_json::json!({ "sub_queries": ["string"] })
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentGrade {
	pub is_relevant: bool,
}
impl StructuredOutput for DocumentGrade {
	const NAME: &'static str = "grade_document";

	fn schema() -> Value {
		serde_json::json!({ "is_relevant": "boolean" })
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialAnswer {
	pub has_answer: bool,
	#[serde(default)]
	pub partial_answer: String,
	#[serde(default)]
	pub source_reference: Option<String>,
}
impl StructuredOutput for PartialAnswer {
	const NAME: &'static str = "map_document_answer";

	fn schema() -> Value {
		serde_json::json!({
			"has_answer": "boolean",
			"partial_answer": "string",
			"source_reference": "string|null",
		})
	}
}
