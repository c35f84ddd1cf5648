//! Shared command-line surface for the land-law binaries.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}

/// `RUST_LOG` wins over the configured level; an unparsable level falls back to `info`.
pub fn init_tracing(log_level: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(log_level))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
