pub mod scheduler;
pub mod trending;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use clap::Parser;

use wayfarer_cli::ConfigArgs;
use wayfarer_storage::db::Db;

use crate::{scheduler::Scheduler, trending::TrendingJob};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Parser)]
#[command(
	version = wayfarer_cli::VERSION,
	rename_all = "kebab",
	styles = wayfarer_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = wayfarer_config::load(&args.config.config)?;

	wayfarer_cli::init_tracing(&config.service.log_level);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let job = TrendingJob::from_config(&config.trending);
	let scheduler = Scheduler::new(Arc::new(db), job, config.trending.interval_seconds);

	tracing::info!(
		interval_seconds = config.trending.interval_seconds,
		window_days = config.trending.window_days,
		"Trending worker started."
	);

	scheduler.run_until(shutdown_signal()).await;

	tracing::info!("Trending worker stopped.");

	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}
}
