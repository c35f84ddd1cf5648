use crate::{
	AgentState, Result, StateUpdate,
	nodes::{self, NodeContext},
	prompts,
};

/// Rewrites the question for another retrieval attempt and advances the retry counter.
pub async fn transform_query(ctx: &NodeContext<'_>, state: &AgentState) -> Result<StateUpdate> {
	let question = nodes::require_question(state)?;
	let messages = prompts::build_transform_messages(&question);
	let rewritten = ctx.providers.chat.complete(&ctx.cfg.query_llm, &messages).await?;
	let rewritten = rewritten.trim();
	let question = if rewritten.is_empty() { question } else { rewritten.to_string() };

	tracing::info!(
		node = "transform_query",
		loop_step = state.loop_step + 1,
		question = %question,
		"Transformed question."
	);

	Ok(StateUpdate {
		question: Some(question),
		queries: Some(Vec::new()),
		is_complex: Some(false),
		loop_step: 1,
		..Default::default()
	})
}
