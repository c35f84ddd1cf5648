use landlaw_domain::{
	format_docs, history, scoring,
	strategy::{self, Strategy},
};

use crate::{
	AgentState, Error, Result, StateUpdate,
	map_reduce::{self, Synthesis},
	nodes::{self, NodeContext},
	prompts,
};

pub async fn generate(ctx: &NodeContext<'_>, state: &AgentState) -> Result<StateUpdate> {
	let question = nodes::require_question(state)?;
	let mut documents = state.documents.clone();

	scoring::sort_by_score(&mut documents);

	let thresholds = ctx.cfg.strategy_thresholds();
	let metrics = strategy::measure(&documents, &thresholds);
	let strategy = strategy::decide(&metrics, &thresholds);
	let history =
		history::history_before_latest(&state.messages, ctx.cfg.generation.history_turns as usize);

	tracing::info!(
		node = "generate",
		strategy = strategy.as_str(),
		documents = metrics.count,
		total_tokens = metrics.total_tokens,
		has_large_doc = metrics.has_large_doc,
		"Selected generation strategy."
	);

	let answer = match strategy {
		Strategy::Standard => {
			let messages =
				prompts::build_generation_messages(&format_docs(&documents), &question, &history);

			ctx.providers
				.chat
				.complete(&ctx.cfg.response_llm, &messages)
				.await
				.map_err(generation_error)?
		},
		Strategy::MapReduce => match map_reduce::synthesize(
			ctx.providers.chat.clone(),
			&ctx.cfg.response_llm,
			&question,
			&documents,
			&history,
		)
		.await
		.map_err(generation_error)?
		{
			Synthesis::Answer(answer) => answer,
			Synthesis::NoRelevantInformation => prompts::NO_RELEVANT_INFORMATION.to_string(),
		},
	};
	let answer = answer.trim();

	if answer.is_empty() {
		return Err(Error::Generation { message: "The model returned an empty answer.".to_string() });
	}

	Ok(StateUpdate::reply(answer))
}

pub fn no_answer(state: &AgentState) -> StateUpdate {
	let question = state.active_question().unwrap_or_default();

	tracing::info!(node = "no_answer", loop_step = state.loop_step, "Retries exhausted without documents.");

	StateUpdate::reply(prompts::no_answer_message(question))
}

fn generation_error(err: Error) -> Error {
	match err {
		Error::Generation { .. } => err,
		other => Error::Generation { message: other.to_string() },
	}
}
