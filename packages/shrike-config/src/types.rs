use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub dedup: Dedup,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub geocoder: GeocoderConfig,
	pub classifier: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeocoderConfig {
	pub llm: LlmProviderConfig,
	pub nominatim_url: String,
	pub timeout_ms: u64,
	/// Results whose bounding box exceeds this many degrees on either axis
	/// are treated as "no location" rather than pinned to a point.
	#[serde(default = "default_max_bbox_degrees")]
	pub max_bbox_degrees: f64,
}

/// Merge-candidate gates. The defaults reproduce observed production
/// behavior; they are cutoffs, not calibrated values.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Dedup {
	pub sim_threshold: f32,
	pub candidate_k: u32,
	pub time_window_minutes: i64,
	pub geo_radius_km: f64,
}
impl Default for Dedup {
	fn default() -> Self {
		Self {
			sim_threshold: 0.35,
			candidate_k: 10,
			time_window_minutes: 180,
			geo_radius_km: 25.0,
		}
	}
}

fn default_max_bbox_degrees() -> f64 {
	2.0
}
