use serde_json::Value;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{Error, Result, models::WorkflowCheckpoint};

pub struct NewCheckpoint<'a> {
	pub thread_id: &'a str,
	pub run_id: Uuid,
	pub step: i64,
	pub next_node: Option<&'a str>,
	pub state: &'a Value,
}

pub async fn insert_checkpoint<'e, E>(executor: E, checkpoint: &NewCheckpoint<'_>) -> Result<Uuid>
where
	E: PgExecutor<'e>,
{
	if checkpoint.thread_id.trim().is_empty() {
		return Err(Error::InvalidArgument("thread_id must be non-empty.".to_string()));
	}

	let checkpoint_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO workflow_checkpoints (checkpoint_id, thread_id, run_id, step, next_node, state)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(checkpoint_id)
	.bind(checkpoint.thread_id)
	.bind(checkpoint.run_id)
	.bind(checkpoint.step)
	.bind(checkpoint.next_node)
	.bind(checkpoint.state)
	.execute(executor)
	.await?;

	Ok(checkpoint_id)
}

pub async fn latest_checkpoint<'e, E>(executor: E, thread_id: &str) -> Result<Option<WorkflowCheckpoint>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, WorkflowCheckpoint>(
		"\
SELECT checkpoint_id, thread_id, run_id, step, next_node, state, created_at
FROM workflow_checkpoints
WHERE thread_id = $1
ORDER BY step DESC, created_at DESC
LIMIT 1",
	)
	.bind(thread_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}
