//! Retrieved law chunks and their identity keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const SIGNATURE_PREFIX_CHARS: usize = 500;

pub const META_SOURCE: &str = "source";
pub const META_TITLE: &str = "title";
pub const META_SCORE: &str = "score";
pub const META_QUERY_INDEX: &str = "queryIndex";
pub const META_ARTICLE_ID: &str = "article_id";
pub const META_CHAPTER_ID: &str = "chapter_id";
pub const META_CHAPTER_TITLE: &str = "chapter_title";
pub const META_SECTION_ID: &str = "section_id";
pub const META_SECTION_TITLE: &str = "section_title";

// Fixed namespace so synthesized ids are stable across processes.
const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c61_6e64_6c61_7700_0000_0000_0000_0001);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: String,
	pub content: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}
impl Document {
	/// Builds a document, synthesizing a deterministic id from `source` and `content` when the
	/// search engine did not assign one. `source` and `title` are always present afterwards.
	pub fn new(id: Option<String>, content: impl Into<String>, mut metadata: Map<String, Value>) -> Self {
		let content = content.into();

		for key in [META_SOURCE, META_TITLE] {
			if !metadata.get(key).map(Value::is_string).unwrap_or(false) {
				metadata.insert(key.to_string(), Value::String(String::new()));
			}
		}

		let id = match id.map(|id| id.trim().to_string()) {
			Some(id) if !id.is_empty() => id,
			_ => synthesize_id(metadata_str(&metadata, META_SOURCE).unwrap_or_default(), &content),
		};

		Self { id, content, metadata }
	}

	pub fn source(&self) -> &str {
		metadata_str(&self.metadata, META_SOURCE).unwrap_or_default()
	}

	pub fn title(&self) -> &str {
		metadata_str(&self.metadata, META_TITLE).unwrap_or_default()
	}

	pub fn article_id(&self) -> Option<&str> {
		metadata_str(&self.metadata, META_ARTICLE_ID)
	}

	pub fn score(&self) -> Option<f32> {
		self.metadata.get(META_SCORE).and_then(Value::as_f64).map(|score| score as f32)
	}

	pub fn query_index(&self) -> Option<usize> {
		self.metadata.get(META_QUERY_INDEX).and_then(Value::as_u64).map(|index| index as usize)
	}

	pub fn with_score(mut self, score: f32) -> Self {
		self.metadata.insert(META_SCORE.to_string(), Value::from(f64::from(score)));

		self
	}

	pub fn with_query_index(mut self, query_index: usize) -> Self {
		self.metadata.insert(META_QUERY_INDEX.to_string(), Value::from(query_index as u64));

		self
	}

	pub fn signature(&self) -> ContentSignature {
		ContentSignature::of(self.source(), &self.content)
	}
}

/// Second dedup key: catches chunks indexed twice under different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentSignature([u8; 32]);
impl ContentSignature {
	pub fn of(source: &str, content: &str) -> Self {
		let prefix: String = content.nfc().take(SIGNATURE_PREFIX_CHARS).collect();
		let mut hasher = blake3::Hasher::new();

		hasher.update(source.as_bytes());
		hasher.update(&[0]);
		hasher.update(prefix.as_bytes());

		Self(*hasher.finalize().as_bytes())
	}
}

pub fn format_doc(doc: &Document) -> String {
	let mut header = Vec::new();

	if let (Some(id), Some(title)) = (
		metadata_str(&doc.metadata, META_CHAPTER_ID),
		metadata_str(&doc.metadata, META_CHAPTER_TITLE),
	) {
		header.push(format!("Chương {id}: {title}"));
	}
	if let (Some(id), Some(title)) = (
		metadata_str(&doc.metadata, META_SECTION_ID),
		metadata_str(&doc.metadata, META_SECTION_TITLE),
	) {
		header.push(format!("Mục {id}: {title}"));
	}

	if header.is_empty() {
		return doc.content.clone();
	}

	format!("{}\n{}", header.join("\n"), doc.content)
}

pub fn format_docs(docs: &[Document]) -> String {
	if docs.is_empty() {
		return String::new();
	}

	let formatted = docs.iter().map(format_doc).collect::<Vec<_>>().join("\n\n");

	format!("<documents>\n{formatted}\n</documents>")
}

fn synthesize_id(source: &str, content: &str) -> String {
	let name = format!("{source}\n{content}");

	Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, name.as_bytes()).to_string()
}

fn metadata_str<'a>(metadata: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
	metadata.get(key).and_then(Value::as_str).filter(|value| !value.is_empty())
}
