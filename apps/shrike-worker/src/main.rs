use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = shrike_worker::Args::parse();

	shrike_worker::run(args).await
}
