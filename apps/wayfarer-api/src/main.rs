use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = wayfarer_api::Args::parse();

	wayfarer_api::run(args).await
}
