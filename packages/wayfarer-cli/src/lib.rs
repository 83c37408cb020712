use std::path::PathBuf;

use clap::{
	Args,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

const FALLBACK_LOG_LEVEL: &str = "info";

/// Arguments shared by every Wayfarer binary.
#[derive(Debug, Args)]
pub struct ConfigArgs {
	/// Path to the TOML configuration file.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Installs the global fmt subscriber. Unparseable directives fall back to `info`.
pub fn init_tracing(log_level: &str) {
	let filter = log_filter(log_level);

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn log_filter(log_level: &str) -> EnvFilter {
	EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_LEVEL))
}
