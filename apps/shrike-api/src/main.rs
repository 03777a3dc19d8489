use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = shrike_api::Args::parse();

	shrike_api::run(args).await
}
