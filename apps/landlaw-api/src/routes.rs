use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use landlaw_domain::Message;
use landlaw_service::{AgentState, Checkpoint, Error as ServiceError, RunInput, RunOverrides};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
	pub messages: Vec<Message>,
	#[serde(default)]
	pub overrides: Option<RunOverrides>,
}

/// Final run state. `documents` are listed highest score first.
#[derive(Debug, Serialize)]
pub struct RunResponse {
	pub thread_id: String,
	#[serde(flatten)]
	pub state: AgentState,
}
impl RunResponse {
	fn new(thread_id: String, mut state: AgentState) -> Self {
		state.documents = state.ranked_documents();

		Self { thread_id, state }
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/threads/{thread_id}", get(latest_checkpoint))
		.route("/v1/threads/{thread_id}/runs", post(run))
		.route("/v1/threads/{thread_id}/resume", post(resume))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn run(
	State(state): State<AppState>,
	Path(thread_id): Path<String>,
	Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
	let thread_id = require_thread_id(thread_id)?;
	let mut cfg = state.run_config.as_ref().clone();

	if let Some(overrides) = payload.overrides.as_ref() {
		cfg = cfg.with_overrides(overrides)?;
	}

	let cfg = cfg.with_thread_id(thread_id.clone());
	let result = state.workflow.invoke(RunInput { messages: payload.messages }, &cfg).await?;

	Ok(Json(RunResponse::new(thread_id, result)))
}

async fn resume(
	State(state): State<AppState>,
	Path(thread_id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
	let thread_id = require_thread_id(thread_id)?;
	let cfg = state.run_config.as_ref().clone().with_thread_id(thread_id.clone());
	let result = state.workflow.resume(&thread_id, &cfg).await?;

	Ok(Json(RunResponse::new(thread_id, result)))
}

async fn latest_checkpoint(
	State(state): State<AppState>,
	Path(thread_id): Path<String>,
) -> Result<Json<Checkpoint>, ApiError> {
	let thread_id = require_thread_id(thread_id)?;
	let checkpoint = state.workflow.latest_checkpoint(&thread_id).await?.ok_or_else(|| {
		json_error(StatusCode::NOT_FOUND, "not_found", format!("No checkpoint for thread {thread_id}."))
	})?;

	Ok(Json(checkpoint))
}

fn require_thread_id(thread_id: String) -> Result<String, ApiError> {
	let thread_id = thread_id.trim();

	if thread_id.is_empty() {
		return Err(json_error(StatusCode::BAD_REQUEST, "invalid_request", "thread_id must not be empty."));
	}

	Ok(thread_id.to_string())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, code) = match &err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
			ServiceError::Search { .. } => (StatusCode::BAD_GATEWAY, "search_error"),
			ServiceError::Generation { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error"),
			ServiceError::Checkpoint { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "checkpoint_error"),
		};

		if status.is_server_error() {
			tracing::warn!(error = %err, error_code = code, "Request failed.");
		}

		json_error(status, code, err.to_string())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
