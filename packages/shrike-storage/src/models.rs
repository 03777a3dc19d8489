use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Source {
	pub source_id: Uuid,
	pub external_id: String,
	pub name: String,
	pub kind: String,
	pub url: Option<String>,
	pub category: Option<String>,
	pub tags: Vec<String>,
	pub reliability: f64,
	pub total_items: i64,
	pub confirmed_items: i64,
	pub disproved_items: i64,
	pub active: bool,
	pub meta: Value,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Item {
	pub item_id: Uuid,
	pub source_id: Uuid,
	pub external_id: String,
	pub kind: String,
	pub title: Option<String>,
	pub content: String,
	pub summary: Option<String>,
	pub language: Option<String>,
	pub priority: Option<String>,
	pub r#type: Option<String>,
	pub category: Option<String>,
	pub tags: Vec<String>,
	pub credibility: Option<f64>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub parsed_at: OffsetDateTime,
	pub occurred_at: Option<OffsetDateTime>,
	pub raw_url: Option<String>,
	pub media_url: Option<String>,
	pub meta: Value,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl Item {
	/// The adjudication verdict stored in the meta blob, if any.
	pub fn review_verdict(&self) -> Option<&str> {
		self.meta.get("review").and_then(|review| review.get("verdict")).and_then(Value::as_str)
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Event {
	pub event_id: Uuid,
	pub title: String,
	pub summary: Option<String>,
	pub description: Option<String>,
	pub r#type: String,
	pub severity: String,
	pub status: String,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub occurred_at: OffsetDateTime,
	pub fingerprint: String,
	pub tags: Vec<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvidenceLink {
	pub event_id: Uuid,
	pub item_id: Uuid,
	pub relation: String,
	pub weight: Option<f64>,
	pub created_at: OffsetDateTime,
}

/// One evidence link joined with its item and source summaries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvidenceRecord {
	pub event_id: Uuid,
	pub item_id: Uuid,
	pub relation: String,
	pub weight: Option<f64>,
	pub created_at: OffsetDateTime,
	pub item_external_id: String,
	pub item_title: Option<String>,
	pub item_credibility: Option<f64>,
	pub item_verdict: Option<String>,
	pub source_name: String,
	pub source_reliability: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IndexOutboxEntry {
	pub outbox_id: Uuid,
	pub doc_kind: String,
	pub doc_id: Uuid,
	pub op: String,
	pub status: String,
	pub attempts: i32,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// Feed source identity as received on ingestion.
#[derive(Debug, Clone)]
pub struct NewSource {
	pub external_id: String,
	pub name: String,
	pub kind: String,
	pub url: Option<String>,
	pub category: Option<String>,
	pub tags: Vec<String>,
}

/// Item payload ready for persistence, enrichment already applied.
#[derive(Debug, Clone)]
pub struct NewItem {
	pub source_id: Uuid,
	pub external_id: String,
	pub kind: String,
	pub title: Option<String>,
	pub content: String,
	pub summary: Option<String>,
	pub language: Option<String>,
	pub priority: Option<String>,
	pub r#type: Option<String>,
	pub category: Option<String>,
	pub tags: Vec<String>,
	pub credibility: Option<f64>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub parsed_at: OffsetDateTime,
	pub occurred_at: Option<OffsetDateTime>,
	pub raw_url: Option<String>,
	pub media_url: Option<String>,
	pub meta: Value,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
	pub title: String,
	pub summary: Option<String>,
	pub description: Option<String>,
	pub r#type: String,
	pub severity: String,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub occurred_at: OffsetDateTime,
	pub fingerprint: String,
	pub tags: Vec<String>,
}
