pub mod routes;
pub mod state;

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;

use wayfarer_cli::ConfigArgs;

use crate::state::AppState;

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

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config).await?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("HTTP server stopped.");

	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}
}
