use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub trending: Trending,
	#[serde(default)]
	pub discovery: Discovery,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// When true, internal error messages are returned to HTTP clients verbatim.
	#[serde(default)]
	pub expose_error_details: bool,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Trending recomputation schedule and score formula.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Trending {
	pub interval_seconds: u64,
	/// Only public items created within this many days are rescored.
	pub window_days: i64,
	pub gravity: f64,
	/// Added to the age in hours before applying gravity.
	pub age_offset_hours: f64,
	/// Scores that moved by this much or less are not written back.
	pub write_epsilon: f64,
	pub weights: EngagementWeights,
}
impl Default for Trending {
	fn default() -> Self {
		Self {
			interval_seconds: 1_800,
			window_days: 7,
			gravity: 1.8,
			age_offset_hours: 2.0,
			write_epsilon: 0.001,
			weights: EngagementWeights::default(),
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngagementWeights {
	pub likes: f64,
	pub comments: f64,
	pub remixes: f64,
}
impl Default for EngagementWeights {
	fn default() -> Self {
		Self { likes: 2.0, comments: 1.0, remixes: 3.0 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Discovery {
	pub default_limit: u32,
	pub max_limit: u32,
}
impl Default for Discovery {
	fn default() -> Self {
		Self { default_limit: 20, max_limit: 100 }
	}
}
