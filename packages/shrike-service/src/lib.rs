pub mod adjudicate;
pub mod dedup;
pub mod evidence;
pub mod ingest;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use adjudicate::{AdjudicateRequest, AdjudicateResponse, UpdatedEvent};
pub use error::{Error, Result};
pub use evidence::{EvidenceEntry, EvidenceResponse};
pub use ingest::{IngestRequest, IngestResponse, IngestSource};

use shrike_config::{Config, EmbeddingProviderConfig, GeocoderConfig, LlmProviderConfig};
use shrike_providers::{classify, classify::Classification, embedding, geocode, geocode::GeoPoint};
use shrike_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait LocationProvider
where
	Self: Send + Sync,
{
	fn locate<'a>(
		&'a self,
		cfg: &'a GeocoderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<GeoPoint>>>;
}

pub trait ClassifierProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Classification>>;
}

/// Fan-out seam for live subscribers. Implementations must not block and must
/// not fail the calling operation.
pub trait Publisher
where
	Self: Send + Sync,
{
	fn publish(&self, topic: &str, payload: Value);
}

pub struct NoopPublisher;
impl Publisher for NoopPublisher {
	fn publish(&self, _topic: &str, _payload: Value) {}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl LocationProvider for DefaultProviders {
	fn locate<'a>(
		&'a self,
		cfg: &'a GeocoderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<GeoPoint>>> {
		Box::pin(geocode::locate(cfg, text))
	}
}

impl ClassifierProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Classification>> {
		Box::pin(classify::classify(cfg, text))
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub geocoder: Arc<dyn LocationProvider>,
	pub classifier: Arc<dyn ClassifierProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		geocoder: Arc<dyn LocationProvider>,
		classifier: Arc<dyn ClassifierProvider>,
	) -> Self {
		Self { embedding, geocoder, classifier }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), geocoder: provider.clone(), classifier: provider }
	}
}

pub struct ShrikeService {
	pub cfg: Config,
	pub db: Db,
	pub qdrant: QdrantStore,
	pub providers: Providers,
	pub publisher: Arc<dyn Publisher>,
}
impl ShrikeService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		Self { cfg, db, qdrant, providers: Providers::default(), publisher: Arc::new(NoopPublisher) }
	}
}
