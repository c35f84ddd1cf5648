//! Node bodies. Each reads the current state and returns partial updates; none mutates state.

pub mod generate;
pub mod grade;
pub mod relevance;
pub mod retrieve;
pub mod routing;
pub mod transform;

use crate::{AgentState, Error, Providers, Result, RunConfig};

pub struct NodeContext<'a> {
	pub providers: &'a Providers,
	pub cfg: &'a RunConfig,
}

pub(crate) fn require_question(state: &AgentState) -> Result<String> {
	state.active_question().map(str::to_string).ok_or_else(|| Error::InvalidRequest {
		message: "The conversation has no question to answer.".to_string(),
	})
}
