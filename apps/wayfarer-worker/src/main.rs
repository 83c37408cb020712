use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = wayfarer_worker::Args::parse();

	wayfarer_worker::run(args).await
}
