mod acceptance {
	mod adjudication;
	mod idempotency;
	mod lifecycle;

	use std::{collections::HashMap, env, sync::Arc};

	use qdrant_client::{Payload, qdrant::PointStruct};
	use serde_json::Map;
	use time::{OffsetDateTime, format_description::well_known::Rfc3339};
	use uuid::Uuid;

	use shrike_config::{
		Config, Dedup, EmbeddingProviderConfig, GeocoderConfig, LlmProviderConfig, Postgres,
		Qdrant, Service, Storage,
	};
	use shrike_providers::{classify::Classification, geocode::GeoPoint};
	use shrike_service::{
		BoxFuture, ClassifierProvider, EmbeddingProvider, IngestRequest, IngestSource,
		LocationProvider, Providers, ShrikeService,
	};
	use shrike_storage::{db::Db, qdrant::QdrantStore};
	use shrike_testkit::TestDatabase;

	pub const VECTOR_DIM: u32 = 4;

	pub fn test_qdrant_url() -> Option<String> {
		env::var("SHRIKE_QDRANT_URL").ok()
	}

	pub async fn test_db() -> Option<TestDatabase> {
		let base_dsn = shrike_testkit::env_dsn()?;
		let db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");

		Some(db)
	}

	/// Every text embeds to the same fixed vector, which makes any two items
	/// perfect dedup matches.
	pub struct StubEmbedding {
		pub vector: Vec<f32>,
	}
	impl EmbeddingProvider for StubEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			let vectors = texts.iter().map(|_| self.vector.clone()).collect();

			Box::pin(async move { Ok(vectors) })
		}
	}

	pub struct StubLocator {
		pub point: Option<GeoPoint>,
	}
	impl LocationProvider for StubLocator {
		fn locate<'a>(
			&'a self,
			_cfg: &'a GeocoderConfig,
			_text: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<Option<GeoPoint>>> {
			let point = self.point;

			Box::pin(async move { Ok(point) })
		}
	}

	pub struct StubClassifier {
		pub classification: Classification,
	}
	impl ClassifierProvider for StubClassifier {
		fn classify<'a>(
			&'a self,
			_cfg: &'a LlmProviderConfig,
			_text: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<Classification>> {
			let classification = self.classification.clone();

			Box::pin(async move { Ok(classification) })
		}
	}

	pub fn unit_vector() -> Vec<f32> {
		let mut vector = vec![0.0; VECTOR_DIM as usize];

		vector[0] = 1.0;

		vector
	}

	pub fn stub_providers() -> Providers {
		Providers::new(
			Arc::new(StubEmbedding { vector: unit_vector() }),
			Arc::new(StubLocator { point: None }),
			Arc::new(StubClassifier { classification: Classification::default() }),
		)
	}

	fn dummy_llm() -> LlmProviderConfig {
		LlmProviderConfig {
			provider_id: "stub".to_string(),
			api_base: "http://localhost".to_string(),
			api_key: "key".to_string(),
			path: "/v1/chat/completions".to_string(),
			model: "m".to_string(),
			temperature: 0.1,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	pub fn test_config(dsn: String, qdrant_url: String, collection: String) -> Config {
		Config {
			service: Service {
				http_bind: "127.0.0.1:0".to_string(),
				log_level: "info".to_string(),
			},
			storage: Storage {
				postgres: Postgres { dsn, pool_max_conns: 2 },
				qdrant: Qdrant { url: qdrant_url, collection, vector_dim: VECTOR_DIM },
			},
			providers: shrike_config::Providers {
				embedding: EmbeddingProviderConfig {
					provider_id: "stub".to_string(),
					api_base: "http://localhost".to_string(),
					api_key: "key".to_string(),
					path: "/v1/embeddings".to_string(),
					model: "m".to_string(),
					dimensions: VECTOR_DIM,
					timeout_ms: 1_000,
					default_headers: Map::new(),
				},
				geocoder: GeocoderConfig {
					llm: dummy_llm(),
					nominatim_url: "http://localhost:8080".to_string(),
					timeout_ms: 1_000,
					max_bbox_degrees: 2.0,
				},
				classifier: dummy_llm(),
			},
			dedup: Dedup::default(),
		}
	}

	pub async fn build_service(
		cfg: Config,
		providers: Providers,
	) -> shrike_service::Result<ShrikeService> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&cfg.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let mut service = ShrikeService::new(cfg, db, qdrant);

		service.providers = providers;

		Ok(service)
	}

	/// Stands in for the index worker: pushes an event document into Qdrant
	/// so the next ingestion can find it.
	pub async fn index_event(
		service: &ShrikeService,
		event_id: Uuid,
		vector: Vec<f32>,
		event_type: &str,
		occurred_at: OffsetDateTime,
	) {
		let mut payload = HashMap::new();

		payload.insert("doc_kind".to_string(), qdrant_client::qdrant::Value::from("event".to_string()));
		payload.insert("doc_id".to_string(), qdrant_client::qdrant::Value::from(event_id.to_string()));
		payload.insert("type".to_string(), qdrant_client::qdrant::Value::from(event_type.to_string()));
		payload.insert(
			"occurred_at".to_string(),
			qdrant_client::qdrant::Value::from(
				occurred_at.format(&Rfc3339).expect("Failed to format timestamp."),
			),
		);

		let point = PointStruct::new(event_id.to_string(), vector, Payload::from(payload));

		service.qdrant.upsert_point(point).await.expect("Failed to upsert event point.");
	}

	pub fn ingest_request(source_key: &str, item_key: &str, content: &str) -> IngestRequest {
		IngestRequest {
			source: IngestSource {
				external_id: source_key.to_string(),
				name: format!("Source {source_key}"),
				kind: Some("feed".to_string()),
				url: None,
				category: None,
				tags: Vec::new(),
			},
			external_id: item_key.to_string(),
			kind: "text".to_string(),
			title: None,
			content: content.to_string(),
			summary: None,
			language: Some("en".to_string()),
			priority: Some("high".to_string()),
			r#type: Some("strike".to_string()),
			category: Some("military".to_string()),
			tags: vec!["artillery".to_string()],
			credibility: Some(0.8),
			latitude: Some(50.45),
			longitude: Some(30.52),
			occurred_at: Some(OffsetDateTime::now_utc()),
			raw_url: None,
			media_url: None,
			meta: serde_json::json!({}),
		}
	}
}
