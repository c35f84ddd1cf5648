use crate::document::{Document, format_doc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Standard,
	MapReduce,
}
impl Strategy {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Standard => "standard",
			Self::MapReduce => "map_reduce",
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct StrategyThresholds {
	pub doc_count_threshold: usize,
	pub max_context_tokens: usize,
	pub large_doc_token_threshold: usize,
	pub chars_per_token: f32,
}
impl From<&landlaw_config::Generation> for StrategyThresholds {
	fn from(cfg: &landlaw_config::Generation) -> Self {
		Self {
			doc_count_threshold: cfg.map_reduce_doc_threshold as usize,
			max_context_tokens: cfg.max_context_tokens as usize,
			large_doc_token_threshold: cfg.large_doc_token_threshold as usize,
			chars_per_token: cfg.chars_per_token,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentMetrics {
	pub count: usize,
	pub total_tokens: usize,
	pub has_large_doc: bool,
}

pub fn estimate_tokens(text: &str, chars_per_token: f32) -> usize {
	(text.chars().count() as f32 / chars_per_token).ceil() as usize
}

pub fn document_tokens(doc: &Document, chars_per_token: f32) -> usize {
	estimate_tokens(&format_doc(doc), chars_per_token)
}

pub fn measure(documents: &[Document], thresholds: &StrategyThresholds) -> DocumentMetrics {
	let mut total_tokens = 0;
	let mut has_large_doc = false;

	for doc in documents {
		let tokens = document_tokens(doc, thresholds.chars_per_token);

		total_tokens += tokens;
		has_large_doc |= tokens > thresholds.large_doc_token_threshold;
	}

	DocumentMetrics { count: documents.len(), total_tokens, has_large_doc }
}

pub fn select_strategy(documents: &[Document], thresholds: &StrategyThresholds) -> Strategy {
	decide(&measure(documents, thresholds), thresholds)
}

pub fn decide(metrics: &DocumentMetrics, thresholds: &StrategyThresholds) -> Strategy {
	if metrics.count > thresholds.doc_count_threshold
		|| metrics.total_tokens > thresholds.max_context_tokens
		|| (metrics.has_large_doc && metrics.count > 4)
	{
		Strategy::MapReduce
	} else {
		Strategy::Standard
	}
}
