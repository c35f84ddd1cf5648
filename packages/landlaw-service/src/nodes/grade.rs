use std::sync::Arc;

use tokio::task::JoinSet;

use landlaw_config::LlmProviderConfig;
use landlaw_domain::{Document, format_doc, scoring};

use crate::{
	AgentState, ChatModel, StateUpdate,
	nodes::NodeContext,
	prompts,
	structured::{self, DocumentGrade},
};

pub async fn grade_documents(ctx: &NodeContext<'_>, state: &AgentState) -> StateUpdate {
	let retrieved = state.documents.len();
	let workflow = &ctx.cfg.workflow;
	let mut graded = scoring::grade(
		state.documents.clone(),
		workflow.score_threshold,
		workflow.min_documents as usize,
	);

	if workflow.llm_grading && !graded.is_empty() {
		let question = state.active_question().unwrap_or_default().to_string();

		graded =
			grade_with_model(ctx.providers.chat.clone(), &ctx.cfg.query_llm, &question, graded).await;
	}

	tracing::info!(
		node = "grade_documents",
		retrieved,
		kept = graded.len(),
		threshold = workflow.score_threshold,
		"Graded documents."
	);

	StateUpdate::documents(graded)
}

/// Asks the model about each document in parallel. A document whose grade fails is dropped.
async fn grade_with_model(
	chat: Arc<dyn ChatModel>,
	cfg: &LlmProviderConfig,
	question: &str,
	documents: Vec<Document>,
) -> Vec<Document> {
	let mut tasks = JoinSet::new();

	for (index, doc) in documents.iter().enumerate() {
		let chat = chat.clone();
		let cfg = cfg.clone();
		let messages = prompts::build_grade_messages(question, &format_doc(doc));

		tasks.spawn(async move {
			let grade: crate::Result<DocumentGrade> =
				structured::request(chat.as_ref(), &cfg, &messages).await;

			(index, grade)
		});
	}

	let mut relevant = vec![false; documents.len()];

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((index, Ok(grade))) => relevant[index] = grade.is_relevant,
			Ok((index, Err(err))) => {
				tracing::warn!(node = "grade_documents", index, error = %err, "Document grading failed.");
			},
			Err(err) => {
				tracing::warn!(node = "grade_documents", error = %err, "Document grading task panicked.");
			},
		}
	}

	documents.into_iter().zip(relevant).filter_map(|(doc, keep)| keep.then_some(doc)).collect()
}
