mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Discovery, EngagementWeights, Postgres, Service, Storage, Trending};

use std::{fs, path::Path};

const DEFAULT_LOG_LEVEL: &str = "info";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_trending(&cfg.trending)?;

	if cfg.discovery.default_limit == 0 {
		return Err(Error::Validation {
			message: "discovery.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.discovery.max_limit < cfg.discovery.default_limit {
		return Err(Error::Validation {
			message: "discovery.max_limit must be at least discovery.default_limit.".to_string(),
		});
	}

	Ok(())
}

fn validate_trending(trending: &Trending) -> Result<()> {
	if trending.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "trending.interval_seconds must be greater than zero.".to_string(),
		});
	}
	if trending.window_days <= 0 {
		return Err(Error::Validation {
			message: "trending.window_days must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("trending.gravity", trending.gravity),
		("trending.age_offset_hours", trending.age_offset_hours),
		("trending.write_epsilon", trending.write_epsilon),
		("trending.weights.likes", trending.weights.likes),
		("trending.weights.comments", trending.weights.comments),
		("trending.weights.remixes", trending.weights.remixes),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if trending.gravity == 0.0 {
		return Err(Error::Validation {
			message: "trending.gravity must be greater than zero.".to_string(),
		});
	}
	// A zero offset lets brand new items divide by zero.
	if trending.age_offset_hours == 0.0 {
		return Err(Error::Validation {
			message: "trending.age_offset_hours must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = DEFAULT_LOG_LEVEL.to_string();
	}

	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
}
