pub mod discovery;
pub mod engagement;
pub mod people;
pub mod store;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use discovery::{DiscoveryItem, DiscoveryPage, DiscoveryRequest, PageInfo};
pub use engagement::{CounterResponse, LikeResponse};
pub use error::{Error, Result};
pub use people::{PeopleRequest, PeopleResponse, PersonItem};
pub use store::{ContentStore, PgContentStore};

use wayfarer_config::Config;
use wayfarer_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct WayfarerService {
	pub cfg: Config,
	pub store: Arc<dyn ContentStore>,
}
impl WayfarerService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgContentStore::new(db)) }
	}

	pub fn with_store(cfg: Config, store: Arc<dyn ContentStore>) -> Self {
		Self { cfg, store }
	}

	/// Resolves a raw `limit` parameter. Missing, non-numeric and non-positive values fall back to
	/// the configured default; larger values are capped.
	pub fn resolve_limit(&self, raw: Option<&str>) -> u32 {
		resolve_limit(raw, self.cfg.discovery.default_limit, self.cfg.discovery.max_limit)
	}
}

pub(crate) fn resolve_limit(raw: Option<&str>, default_limit: u32, max_limit: u32) -> u32 {
	let requested = raw.and_then(|value| value.trim().parse::<i64>().ok()).filter(|n| *n >= 1);

	match requested {
		Some(n) => u32::try_from(n).unwrap_or(u32::MAX).min(max_limit),
		None => default_limit.min(max_limit),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn limit_falls_back_to_default() {
		assert_eq!(resolve_limit(None, 20, 100), 20);
		assert_eq!(resolve_limit(Some("abc"), 20, 100), 20);
		assert_eq!(resolve_limit(Some("0"), 20, 100), 20);
		assert_eq!(resolve_limit(Some("-4"), 20, 100), 20);
		assert_eq!(resolve_limit(Some("2.5"), 20, 100), 20);
	}

	#[test]
	fn limit_is_capped() {
		assert_eq!(resolve_limit(Some(" 7 "), 20, 100), 7);
		assert_eq!(resolve_limit(Some("500"), 20, 100), 100);
		assert_eq!(resolve_limit(Some("99999999999"), 20, 100), 100);
	}
}
