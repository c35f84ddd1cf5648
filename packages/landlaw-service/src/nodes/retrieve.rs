//! Fan-out retrieval: one search per sub-query (or one for the question), joined before grading.

use tokio::task::JoinSet;

use landlaw_domain::Document;

use crate::{
	AgentState, Result, SearchOptions, StateUpdate,
	nodes::{self, NodeContext},
};

/// Isolated input of one retrieval branch.
#[derive(Debug, Clone)]
pub struct QueryInput {
	pub query: String,
	pub query_index: usize,
}

pub fn branches(state: &AgentState) -> Result<Vec<QueryInput>> {
	let queries = if state.is_complex && !state.queries.is_empty() {
		state.queries.clone()
	} else {
		vec![nodes::require_question(state)?]
	};

	Ok(queries
		.into_iter()
		.enumerate()
		.map(|(query_index, query)| QueryInput { query, query_index })
		.collect())
}

/// Returns one document update per branch that produced documents, ordered by query index.
/// Failed and empty branches contribute nothing.
pub async fn retrieve_documents(
	ctx: &NodeContext<'_>,
	state: &AgentState,
) -> Result<Vec<StateUpdate>> {
	let inputs = branches(state)?;
	let limit = if state.is_complex {
		ctx.cfg.search.docs_per_sub_query
	} else {
		ctx.cfg.search.limit
	};
	let options =
		SearchOptions { limit, alpha: ctx.cfg.search.alpha, filters: ctx.cfg.filters.clone() };
	let mut tasks = JoinSet::new();

	for input in inputs {
		let search = ctx.providers.search.clone();
		let options = options.clone();

		tasks.spawn(async move {
			let result = search.hybrid_search(&input.query, &options).await;

			(input, result)
		});
	}

	let mut outputs: Vec<(usize, Vec<Document>)> = Vec::new();

	while let Some(joined) = tasks.join_next().await {
		let (input, result) = match joined {
			Ok(done) => done,
			Err(err) => {
				tracing::warn!(node = "retrieve_documents", error = %err, "Retrieval branch panicked.");

				continue;
			},
		};

		match result {
			Ok(documents) => {
				tracing::info!(
					node = "retrieve_documents",
					query_index = input.query_index,
					documents = documents.len(),
					"Retrieved documents."
				);

				let documents = documents
					.into_iter()
					.map(|doc| doc.with_query_index(input.query_index))
					.collect::<Vec<_>>();

				outputs.push((input.query_index, documents));
			},
			Err(err) => {
				tracing::warn!(
					node = "retrieve_documents",
					query_index = input.query_index,
					query = %input.query,
					error = %err,
					"Retrieval branch failed; dropping its contribution."
				);
			},
		}
	}

	outputs.sort_by_key(|(query_index, _)| *query_index);

	Ok(outputs
		.into_iter()
		.filter(|(_, documents)| !documents.is_empty())
		.map(|(_, documents)| StateUpdate::documents(documents))
		.collect())
}
