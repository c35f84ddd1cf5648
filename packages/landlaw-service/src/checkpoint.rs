use std::{collections::HashMap, sync::Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use landlaw_storage::{
	checkpoints::{self, NewCheckpoint},
	db::Db,
};

use crate::{AgentState, BoxFuture, Checkpointer, Error, Node, Result};

/// State snapshot written after a node (or a whole fan-out) completes. `next_node` is `None` once
/// the run reached a terminal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
	pub thread_id: String,
	pub run_id: Uuid,
	pub step: u64,
	pub next_node: Option<Node>,
	pub state: AgentState,
}
impl Checkpoint {
	pub fn is_complete(&self) -> bool {
		self.next_node.is_none()
	}
}

/// Keeps every checkpoint per thread in memory. Intended for tests and single-process tools.
#[derive(Default)]
pub struct MemoryCheckpointer {
	threads: Mutex<HashMap<String, Vec<Checkpoint>>>,
}
impl MemoryCheckpointer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn history(&self, thread_id: &str) -> Vec<Checkpoint> {
		let threads = self.threads.lock().unwrap_or_else(|err| err.into_inner());

		threads.get(thread_id).cloned().unwrap_or_default()
	}
}
impl Checkpointer for MemoryCheckpointer {
	fn load<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, Result<Option<Checkpoint>>> {
		let latest = {
			let threads = self.threads.lock().unwrap_or_else(|err| err.into_inner());

			threads.get(thread_id).and_then(|history| history.last().cloned())
		};

		Box::pin(async move { Ok(latest) })
	}

	fn save<'a>(&'a self, checkpoint: &'a Checkpoint) -> BoxFuture<'a, Result<()>> {
		{
			let mut threads = self.threads.lock().unwrap_or_else(|err| err.into_inner());

			threads.entry(checkpoint.thread_id.clone()).or_default().push(checkpoint.clone());
		}

		Box::pin(async move { Ok(()) })
	}
}

pub struct PostgresCheckpointer {
	pub db: Db,
}
impl PostgresCheckpointer {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl Checkpointer for PostgresCheckpointer {
	fn load<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, Result<Option<Checkpoint>>> {
		Box::pin(async move {
			let Some(row) = checkpoints::latest_checkpoint(&self.db.pool, thread_id)
				.await
				.map_err(checkpoint_error)?
			else {
				return Ok(None);
			};
			let next_node = match row.next_node.as_deref() {
				Some(name) => Some(Node::parse(name).ok_or_else(|| Error::Checkpoint {
					message: format!("Unknown node {name} in checkpoint."),
				})?),
				None => None,
			};
			let state: AgentState = serde_json::from_value(row.state).map_err(|err| {
				Error::Checkpoint { message: format!("Failed to decode checkpoint state: {err}.") }
			})?;
			let step = checkpoint_step(row.step)?;

			Ok(Some(Checkpoint {
				thread_id: row.thread_id,
				run_id: row.run_id,
				step,
				next_node,
				state,
			}))
		})
	}

	fn save<'a>(&'a self, checkpoint: &'a Checkpoint) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let state = serde_json::to_value(&checkpoint.state).map_err(|err| Error::Checkpoint {
				message: format!("Failed to encode checkpoint state: {err}."),
			})?;
			let step = i64::try_from(checkpoint.step).map_err(|_| Error::Checkpoint {
				message: "Checkpoint step is out of range.".to_string(),
			})?;

			checkpoints::insert_checkpoint(
				&self.db.pool,
				&NewCheckpoint {
					thread_id: &checkpoint.thread_id,
					run_id: checkpoint.run_id,
					step,
					next_node: checkpoint.next_node.map(Node::as_str),
					state: &state,
				},
			)
			.await
			.map_err(checkpoint_error)?;

			Ok(())
		})
	}
}

/// Stored steps are non-negative; a negative value means the row is corrupt.
fn checkpoint_step(stored: i64) -> Result<u64> {
	u64::try_from(stored).map_err(|_| Error::Checkpoint {
		message: format!("Checkpoint step {stored} is negative."),
	})
}

fn checkpoint_error(err: landlaw_storage::Error) -> Error {
	match err {
		landlaw_storage::Error::InvalidArgument(message) => Error::InvalidRequest { message },
		other => Error::Checkpoint { message: other.to_string() },
	}
}
