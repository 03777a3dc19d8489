use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod worker;

#[derive(Debug, Parser)]
#[command(
	version = shrike_cli::VERSION,
	rename_all = "kebab",
	styles = shrike_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = shrike_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = shrike_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema().await?;
	let qdrant = shrike_storage::qdrant::QdrantStore::new(&config.storage.qdrant)?;
	qdrant.ensure_collection().await?;

	let state = worker::WorkerState { db, qdrant, embedding: config.providers.embedding };

	worker::run_worker(state).await
}
