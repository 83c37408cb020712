use std::sync::Arc;

use wayfarer_config::Config;
use wayfarer_service::WayfarerService;
use wayfarer_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<WayfarerService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(WayfarerService::new(config, db)))
	}

	pub fn from_service(service: WayfarerService) -> Self {
		Self { service: Arc::new(service) }
	}

	pub fn expose_error_details(&self) -> bool {
		self.service.cfg.service.expose_error_details
	}
}
