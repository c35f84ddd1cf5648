//! Map-reduce synthesis for large document sets.
//!
//! The map phase asks the model, per document and in parallel, what that document alone says
//! about the question. The reduce phase combines the useful partials in one call, and is skipped
//! when there are none. Model calls = documents + (0 or 1).

use std::sync::Arc;

use tokio::task::JoinSet;

use landlaw_config::LlmProviderConfig;
use landlaw_domain::{Document, format_doc};

use crate::{
	ChatModel, Result, prompts,
	structured::{self, PartialAnswer},
};

pub enum Synthesis {
	Answer(String),
	NoRelevantInformation,
}

pub async fn synthesize(
	chat: Arc<dyn ChatModel>,
	cfg: &LlmProviderConfig,
	question: &str,
	documents: &[Document],
	history: &str,
) -> Result<Synthesis> {
	let partials = map_documents(chat.clone(), cfg, question, documents).await;

	tracing::info!(
		documents = documents.len(),
		relevant = partials.len(),
		"Map phase finished."
	);

	if partials.is_empty() {
		return Ok(Synthesis::NoRelevantInformation);
	}

	let messages = prompts::build_reduce_messages(question, &format_partials(&partials), history);
	let answer = chat.complete(cfg, &messages).await?;

	Ok(Synthesis::Answer(answer))
}

/// Runs the map phase and returns the partials that carry an answer, in document order. A failed
/// map call counts as "no answer".
pub async fn map_documents(
	chat: Arc<dyn ChatModel>,
	cfg: &LlmProviderConfig,
	question: &str,
	documents: &[Document],
) -> Vec<PartialAnswer> {
	let mut tasks = JoinSet::new();

	for (index, doc) in documents.iter().enumerate() {
		let chat = chat.clone();
		let cfg = cfg.clone();
		let messages = prompts::build_map_messages(&format_doc(doc), question);
		let article_id = doc.article_id().unwrap_or("unknown").to_string();

		tasks.spawn(async move {
			let partial: Result<PartialAnswer> =
				structured::request(chat.as_ref(), &cfg, &messages).await;

			(index, article_id, partial)
		});
	}

	let mut partials: Vec<(usize, PartialAnswer)> = Vec::new();

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((index, _, Ok(partial))) =>
				if partial.has_answer && !partial.partial_answer.trim().is_empty() {
					partials.push((index, partial));
				},
			Ok((index, article_id, Err(err))) => {
				tracing::warn!(index, article_id = %article_id, error = %err, "Map call failed; treating as no answer.");
			},
			Err(err) => {
				tracing::warn!(error = %err, "Map task panicked; treating as no answer.");
			},
		}
	}

	partials.sort_by_key(|(index, _)| *index);

	partials.into_iter().map(|(_, partial)| partial).collect()
}

pub fn format_partials(partials: &[PartialAnswer]) -> String {
	partials
		.iter()
		.enumerate()
		.map(|(index, partial)| {
			let reference = partial
				.source_reference
				.as_deref()
				.map(str::trim)
				.filter(|reference| !reference.is_empty())
				.map(str::to_string)
				.unwrap_or_else(|| format!("Nguồn {}", index + 1));

			format!("[{reference}]\n{}", partial.partial_answer.trim())
		})
		.collect::<Vec<_>>()
		.join("\n\n---\n\n")
}
