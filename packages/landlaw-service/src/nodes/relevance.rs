use crate::{
	AgentState, Result, StateUpdate,
	nodes::{self, NodeContext},
	prompts,
	structured::{self, LandLawRelevance},
};

pub async fn check_relevance(ctx: &NodeContext<'_>, state: &AgentState) -> Result<StateUpdate> {
	let question = nodes::require_question(state)?;
	let messages = prompts::build_relevance_messages(&question);
	let verdict: LandLawRelevance =
		structured::request(ctx.providers.chat.as_ref(), &ctx.cfg.query_llm, &messages).await?;

	tracing::info!(
		node = "check_relevance",
		related = verdict.is_related_to_land_law,
		reasoning = %verdict.reasoning,
		"Checked land-law relevance."
	);

	Ok(StateUpdate {
		question: Some(question),
		is_related_to_land_law: Some(verdict.is_related_to_land_law),
		..Default::default()
	})
}

pub fn reject_question(state: &AgentState) -> StateUpdate {
	let question = state.active_question().unwrap_or_default();

	tracing::info!(node = "reject_question", "Question rejected as unrelated to land law.");

	StateUpdate::reply(prompts::reject_message(question))
}
