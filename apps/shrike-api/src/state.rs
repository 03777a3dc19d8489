use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use shrike_service::{Publisher, ShrikeService};
use shrike_storage::{db::Db, qdrant::QdrantStore};

const STREAM_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ShrikeService>,
	pub stream: broadcast::Sender<String>,
}
impl AppState {
	pub async fn new(config: shrike_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let (stream, _) = broadcast::channel(STREAM_CHANNEL_CAPACITY);
		let mut service = ShrikeService::new(config, db, qdrant);

		service.publisher = Arc::new(BroadcastPublisher { stream: stream.clone() });

		Ok(Self { service: Arc::new(service), stream })
	}
}

/// Fans service notifications out to websocket subscribers. Lagging or absent
/// subscribers are dropped silently, never back onto the ingest path.
struct BroadcastPublisher {
	stream: broadcast::Sender<String>,
}
impl Publisher for BroadcastPublisher {
	fn publish(&self, topic: &str, payload: Value) {
		let frame = serde_json::json!({ "topic": topic, "payload": payload });

		let _ = self.stream.send(frame.to_string());
	}
}
