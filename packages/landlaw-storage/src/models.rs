use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowCheckpoint {
	pub checkpoint_id: Uuid,
	pub thread_id: String,
	pub run_id: Uuid,
	pub step: i64,
	pub next_node: Option<String>,
	pub state: Value,
	pub created_at: OffsetDateTime,
}
