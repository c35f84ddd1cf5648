pub const DENSE_VECTOR_NAME: &str = "dense";
pub const BM25_VECTOR_NAME: &str = "bm25";
pub const BM25_MODEL: &str = "qdrant/bm25";
pub const CONTENT_KEYS: [&str; 3] = ["content", "page_content", "text"];

use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Document as Bm25Document, Filter, PointId, Query, QueryPointsBuilder, ScoredPoint,
	Value as QdrantValue, point_id::PointIdOptions, value::Kind,
};
use serde_json::{Map, Number, Value};

use landlaw_domain::{Document, MetadataFilters};

use crate::{
	Result,
	fusion::{self, Hit},
};

pub struct HybridQuery<'a> {
	pub text: &'a str,
	pub vector: Vec<f32>,
	pub limit: u32,
	pub alpha: f32,
	pub filters: &'a MetadataFilters,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &landlaw_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Runs the dense and BM25 legs separately and fuses them by relative score. A leg whose
	/// weight is zero is skipped.
	pub async fn hybrid_search(&self, query: HybridQuery<'_>) -> Result<Vec<Document>> {
		let candidate_k = u64::from(query.limit.saturating_mul(2).max(1));
		let filter = build_filter(query.filters);
		let dense = if query.alpha > 0.0 {
			let mut search = QueryPointsBuilder::new(self.collection.clone())
				.query(Query::new_nearest(query.vector))
				.using(DENSE_VECTOR_NAME)
				.limit(candidate_k)
				.with_payload(true);

			if let Some(filter) = filter.clone() {
				search = search.filter(filter);
			}

			self.client.query(search).await?.result.into_iter().filter_map(point_to_hit).collect()
		} else {
			Vec::new()
		};
		let lexical = if query.alpha < 1.0 {
			let mut search = QueryPointsBuilder::new(self.collection.clone())
				.query(Query::new_nearest(Bm25Document::new(query.text, BM25_MODEL)))
				.using(BM25_VECTOR_NAME)
				.limit(candidate_k)
				.with_payload(true);

			if let Some(filter) = filter {
				search = search.filter(filter);
			}

			self.client.query(search).await?.result.into_iter().filter_map(point_to_hit).collect()
		} else {
			Vec::new()
		};
		let fused = fusion::fuse(dense, lexical, query.alpha, query.limit as usize);

		Ok(fused.into_iter().filter_map(hit_to_document).collect())
	}
}

pub fn build_filter(filters: &MetadataFilters) -> Option<Filter> {
	let must = filters
		.pairs()
		.into_iter()
		.map(|(key, value)| Condition::matches(key, value.to_string()))
		.collect::<Vec<_>>();

	if must.is_empty() {
		return None;
	}

	Some(Filter { must, ..Default::default() })
}

/// Maps a fused hit onto a law chunk. The text body is taken from the first present content key;
/// a nested `metadata` object is flattened. Hits without text are dropped.
pub fn hit_to_document(hit: Hit) -> Option<Document> {
	let Hit { id, score, mut payload } = hit;
	let content = CONTENT_KEYS.iter().find_map(|key| match payload.remove(*key) {
		Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
		_ => None,
	});
	let Some(content) = content else {
		tracing::warn!(point_id = %id, "Search hit has no text payload.");

		return None;
	};
	let mut metadata = Map::new();

	if let Some(Value::Object(nested)) = payload.remove("metadata") {
		metadata.extend(nested);
	}

	metadata.extend(payload);

	Some(Document::new(Some(id), content, metadata).with_score(score))
}

fn point_to_hit(point: ScoredPoint) -> Option<Hit> {
	let id = point_id_string(point.id.as_ref())?;

	Some(Hit { id, score: point.score, payload: payload_to_json(&point.payload) })
}

fn point_id_string(point_id: Option<&PointId>) -> Option<String> {
	match point_id?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(id) => Some(id.clone()),
		PointIdOptions::Num(id) => Some(id.to_string()),
	}
}

fn payload_to_json(payload: &HashMap<String, QdrantValue>) -> Map<String, Value> {
	payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect()
}

fn value_to_json(value: &QdrantValue) -> Value {
	match &value.kind {
		Some(Kind::BoolValue(value)) => Value::Bool(*value),
		Some(Kind::IntegerValue(value)) => Value::from(*value),
		Some(Kind::DoubleValue(value)) => Number::from_f64(*value).map(Value::Number).unwrap_or(Value::Null),
		Some(Kind::StringValue(value)) => Value::String(value.clone()),
		Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => Value::Object(
			object.fields.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect(),
		),
		Some(Kind::NullValue(_)) | None => Value::Null,
	}
}
