use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = landlaw_api::Args::parse();

	landlaw_api::run(args).await
}
