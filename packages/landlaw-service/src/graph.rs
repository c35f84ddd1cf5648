//! The workflow definition and its runner.
//!
//! `Workflow` is immutable and shared; every call threads its own `AgentState`. After each node
//! (after the join for the fan-out step) the state is checkpointed when the run has a thread id
//! and a checkpointer is configured.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use landlaw_domain::{Message, Role, message::add_messages};

use crate::{
	AgentState, Checkpoint, Checkpointer, Error, Providers, Result, RunConfig, StateUpdate,
	nodes::{NodeContext, generate, grade, relevance, retrieve, routing, transform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
	CheckRelevance,
	RejectQuestion,
	RouteQuery,
	DecomposeQuery,
	RetrieveDocuments,
	GradeDocuments,
	TransformQuery,
	Generate,
	NoAnswer,
}
impl Node {
	pub const START: Self = Self::CheckRelevance;
	pub const ALL: [Self; 9] = [
		Self::CheckRelevance,
		Self::RejectQuestion,
		Self::RouteQuery,
		Self::DecomposeQuery,
		Self::RetrieveDocuments,
		Self::GradeDocuments,
		Self::TransformQuery,
		Self::Generate,
		Self::NoAnswer,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::CheckRelevance => "check_relevance",
			Self::RejectQuestion => "reject_question",
			Self::RouteQuery => "route_query",
			Self::DecomposeQuery => "decompose_query",
			Self::RetrieveDocuments => "retrieve_documents",
			Self::GradeDocuments => "grade_documents",
			Self::TransformQuery => "transform_query",
			Self::Generate => "generate",
			Self::NoAnswer => "no_answer",
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|node| node.as_str() == name)
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, Self::RejectQuestion | Self::Generate | Self::NoAnswer)
	}
}

/// Transition table. `None` after a terminal node.
pub fn next_node(node: Node, state: &AgentState, cfg: &RunConfig) -> Option<Node> {
	match node {
		Node::CheckRelevance =>
			Some(if state.is_related_to_land_law { Node::RouteQuery } else { Node::RejectQuestion }),
		Node::RouteQuery =>
			Some(if state.is_complex { Node::DecomposeQuery } else { Node::RetrieveDocuments }),
		Node::DecomposeQuery => Some(Node::RetrieveDocuments),
		Node::RetrieveDocuments => Some(Node::GradeDocuments),
		Node::GradeDocuments =>
			if !state.documents.is_empty() {
				Some(Node::Generate)
			} else if state.loop_step < cfg.workflow.max_retries {
				Some(Node::TransformQuery)
			} else {
				Some(Node::NoAnswer)
			},
		Node::TransformQuery => Some(Node::CheckRelevance),
		Node::RejectQuestion | Node::Generate | Node::NoAnswer => None,
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunInput {
	pub messages: Vec<Message>,
}

struct Cursor {
	thread_id: Option<String>,
	run_id: Uuid,
	step: u64,
}

pub struct Workflow {
	providers: Providers,
	checkpointer: Option<Arc<dyn Checkpointer>>,
}
impl Workflow {
	pub fn new(providers: Providers) -> Self {
		Self { providers, checkpointer: None }
	}

	pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
		self.checkpointer = Some(checkpointer);

		self
	}

	/// Starts a run. With a thread id and a checkpointer, the thread's persisted conversation is
	/// carried over and the new messages are appended to it.
	pub async fn invoke(&self, input: RunInput, cfg: &RunConfig) -> Result<AgentState> {
		let has_question = input
			.messages
			.iter()
			.any(|message| message.role == Role::Human && !message.content.trim().is_empty());

		if !has_question {
			return Err(Error::InvalidRequest {
				message: "messages must include a non-empty human message.".to_string(),
			});
		}

		let mut messages = Vec::new();
		let mut step = 0;

		if let (Some(thread_id), Some(checkpointer)) = (cfg.thread_id.as_deref(), &self.checkpointer)
			&& let Some(previous) = checkpointer.load(thread_id).await?
		{
			if !previous.is_complete() {
				tracing::warn!(
					thread_id,
					next_node = previous.next_node.map(Node::as_str),
					"Starting a new run over an unfinished checkpoint."
				);
			}

			messages = previous.state.messages;
			step = previous.step + 1;
		}

		add_messages(&mut messages, input.messages);

		let cursor = Cursor { thread_id: cfg.thread_id.clone(), run_id: Uuid::new_v4(), step };

		self.run(AgentState::from_messages(messages), Node::START, cursor, cfg).await
	}

	/// Continues the thread's latest run from its next node. A finished run is returned as is.
	pub async fn resume(&self, thread_id: &str, cfg: &RunConfig) -> Result<AgentState> {
		let checkpoint = self.latest_checkpoint(thread_id).await?.ok_or_else(|| Error::NotFound {
			message: format!("No checkpoint for thread {thread_id}."),
		})?;
		let Some(next) = checkpoint.next_node else {
			return Ok(checkpoint.state);
		};
		let cursor = Cursor {
			thread_id: Some(thread_id.to_string()),
			run_id: checkpoint.run_id,
			step: checkpoint.step + 1,
		};

		tracing::info!(thread_id, next_node = next.as_str(), step = checkpoint.step, "Resuming run.");

		self.run(checkpoint.state, next, cursor, cfg).await
	}

	pub async fn latest_checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
		let Some(checkpointer) = &self.checkpointer else {
			return Err(Error::InvalidRequest {
				message: "Checkpointing is not configured.".to_string(),
			});
		};

		checkpointer.load(thread_id).await
	}

	async fn run(
		&self,
		mut state: AgentState,
		start: Node,
		mut cursor: Cursor,
		cfg: &RunConfig,
	) -> Result<AgentState> {
		let ctx = NodeContext { providers: &self.providers, cfg };
		let mut node = start;

		loop {
			for update in self.execute(&ctx, node, &state).await? {
				state.apply(update);
			}

			let next = next_node(node, &state, cfg);

			tracing::info!(
				node = node.as_str(),
				next_node = next.map(Node::as_str),
				step = cursor.step,
				loop_step = state.loop_step,
				documents = state.documents.len(),
				"Workflow node completed."
			);

			self.checkpoint(&cursor, next, &state).await?;

			cursor.step += 1;

			match next {
				Some(next) => node = next,
				None => return Ok(state),
			}
		}
	}

	async fn execute(
		&self,
		ctx: &NodeContext<'_>,
		node: Node,
		state: &AgentState,
	) -> Result<Vec<StateUpdate>> {
		let update = match node {
			Node::CheckRelevance => relevance::check_relevance(ctx, state).await?,
			Node::RejectQuestion => relevance::reject_question(state),
			Node::RouteQuery => routing::route_query(ctx, state).await?,
			Node::DecomposeQuery => routing::decompose_query(ctx, state).await?,
			Node::RetrieveDocuments => return retrieve::retrieve_documents(ctx, state).await,
			Node::GradeDocuments => grade::grade_documents(ctx, state).await,
			Node::TransformQuery => transform::transform_query(ctx, state).await?,
			Node::Generate => generate::generate(ctx, state).await?,
			Node::NoAnswer => generate::no_answer(state),
		};

		Ok(vec![update])
	}

	async fn checkpoint(&self, cursor: &Cursor, next: Option<Node>, state: &AgentState) -> Result<()> {
		let (Some(thread_id), Some(checkpointer)) = (&cursor.thread_id, &self.checkpointer) else {
			return Ok(());
		};
		let checkpoint = Checkpoint {
			thread_id: thread_id.clone(),
			run_id: cursor.run_id,
			step: cursor.step,
			next_node: next,
			state: state.clone(),
		};

		checkpointer.save(&checkpoint).await
	}
}
