pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Generation error: {message}")]
	Generation { message: String },
	#[error("Checkpoint error: {message}")]
	Checkpoint { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
}
impl From<landlaw_providers::Error> for Error {
	fn from(err: landlaw_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<landlaw_config::Error> for Error {
	fn from(err: landlaw_config::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
