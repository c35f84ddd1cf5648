use std::collections::HashSet;

use crate::{
	AgentState, Result, StateUpdate,
	nodes::{self, NodeContext},
	prompts,
	structured::{self, Decomposition, RouteDecision},
};

pub async fn route_query(ctx: &NodeContext<'_>, state: &AgentState) -> Result<StateUpdate> {
	let question = nodes::require_question(state)?;
	let messages = prompts::build_route_messages(&question);
	let decision: RouteDecision =
		structured::request(ctx.providers.chat.as_ref(), &ctx.cfg.query_llm, &messages).await?;

	tracing::info!(
		node = "route_query",
		is_complex = decision.is_complex,
		reasoning = %decision.reasoning,
		"Routed question."
	);

	Ok(StateUpdate {
		question: Some(question),
		is_complex: Some(decision.is_complex),
		..Default::default()
	})
}

pub async fn decompose_query(ctx: &NodeContext<'_>, state: &AgentState) -> Result<StateUpdate> {
	let question = nodes::require_question(state)?;
	let max_sub_queries = ctx.cfg.workflow.max_sub_queries;
	let messages = prompts::build_decompose_messages(&question, max_sub_queries);
	let decomposition: Decomposition =
		structured::request(ctx.providers.chat.as_ref(), &ctx.cfg.query_llm, &messages).await?;
	let queries =
		normalize_sub_queries(decomposition.sub_queries, &question, max_sub_queries as usize);

	tracing::info!(node = "decompose_query", sub_queries = queries.len(), "Decomposed question.");

	Ok(StateUpdate { queries: Some(queries), ..Default::default() })
}

/// Trims, drops blanks and case-insensitive duplicates, and caps the list. Falls back to the
/// question itself when nothing usable remains.
pub fn normalize_sub_queries(raw: Vec<String>, question: &str, max: usize) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for query in raw {
		let query = query.trim();

		if query.is_empty() || !seen.insert(query.to_lowercase()) {
			continue;
		}

		out.push(query.to_string());

		if out.len() == max {
			break;
		}
	}

	if out.is_empty() {
		out.push(question.to_string());
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sub_queries_are_cleaned_and_capped() {
		let raw = vec![
			" Điều kiện chuyển nhượng quyền sử dụng đất ".to_string(),
			"".to_string(),
			"điều kiện chuyển nhượng quyền sử dụng đất".to_string(),
			"Thủ tục thế chấp quyền sử dụng đất".to_string(),
			"Thuế thu nhập khi chuyển nhượng".to_string(),
		];
		let queries = normalize_sub_queries(raw, "q", 2);

		assert_eq!(
			queries,
			vec![
				"Điều kiện chuyển nhượng quyền sử dụng đất".to_string(),
				"Thủ tục thế chấp quyền sử dụng đất".to_string(),
			]
		);
	}

	#[test]
	fn empty_decomposition_falls_back_to_question() {
		assert_eq!(normalize_sub_queries(vec!["  ".to_string()], "Điều 152?", 3), vec!["Điều 152?"]);
	}
}
