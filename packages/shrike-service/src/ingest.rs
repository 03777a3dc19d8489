use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use shrike_domain::{DedupQuery, Severity, derive_summary, derive_title, fingerprint, normalize_type, reliability};
use shrike_providers::{classify::Classification, geocode::GeoPoint};
use shrike_storage::{
	models::{Event, Item, NewEvent, NewItem, NewSource, Source},
	outbox, queries,
};

use crate::{Error, Result, ShrikeService, time_serde};

const DEFAULT_EVENT_TYPE: &str = "osint_report";

fn default_kind() -> String {
	"text".to_string()
}

fn default_meta() -> Value {
	Value::Object(Map::new())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestSource {
	pub external_id: String,
	pub name: String,
	#[serde(default)]
	pub kind: Option<String>,
	pub url: Option<String>,
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestRequest {
	pub source: IngestSource,
	pub external_id: String,
	#[serde(default = "default_kind")]
	pub kind: String,
	pub title: Option<String>,
	pub content: String,
	pub summary: Option<String>,
	pub language: Option<String>,
	pub priority: Option<String>,
	pub r#type: Option<String>,
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	pub credibility: Option<f64>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	#[serde(default, with = "time_serde::option")]
	pub occurred_at: Option<OffsetDateTime>,
	pub raw_url: Option<String>,
	pub media_url: Option<String>,
	#[serde(default = "default_meta")]
	pub meta: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestResponse {
	pub item_id: Uuid,
	pub event_id: Uuid,
	pub created_event: bool,
	pub linked: bool,
	pub source_reliability: f64,
}

impl ShrikeService {
	/// Ingests one feed item: persist it idempotently, enrich it, merge it
	/// into an existing event or open a new one, and link it as evidence.
	pub async fn ingest(&self, request: IngestRequest) -> Result<IngestResponse> {
		if request.external_id.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Item external_id must not be empty.".to_string(),
			});
		}
		if request.content.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Item content must not be empty.".to_string(),
			});
		}
		if request.source.external_id.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Source external_id must not be empty.".to_string(),
			});
		}

		let now = OffsetDateTime::now_utc();
		let (source, item) = self.persist_item(&request, now).await?;
		let text = concat_text(&item);
		let (geo, classification) = tokio::join!(
			self.locate_opt(item.latitude.is_none() || item.longitude.is_none(), &text),
			self.classify_opt(item.category.is_none() || item.r#type.is_none(), &text),
		);
		let latitude = item.latitude.or(geo.map(|point| point.latitude));
		let longitude = item.longitude.or(geo.map(|point| point.longitude));
		let occurred_at = item.occurred_at.unwrap_or(item.parsed_at);
		let event_type = item
			.r#type
			.clone()
			.or_else(|| classification.as_ref().and_then(|c| c.category.clone()))
			.map(|t| normalize_type(&t))
			.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string());
		let query = DedupQuery { event_type: event_type.clone(), occurred_at, latitude, longitude };
		let candidate = self.resolve_candidate(&text, &query).await;
		let (event, created_event) = self
			.settle_event(&item, classification.as_ref(), &event_type, occurred_at, latitude, longitude, candidate.map(|c| c.event_id))
			.await?;
		let weight = item.credibility;
		let linked = match queries::attach_evidence(
			&self.db.pool,
			event.event_id,
			item.item_id,
			"support",
			weight,
		)
		.await
		{
			Ok(_) => true,
			Err(err) => {
				tracing::warn!(
					error = %err,
					item_id = %item.item_id,
					event_id = %event.event_id,
					"Evidence attach failed; re-ingestion will retry the link."
				);

				false
			},
		};

		self.publisher.publish(
			"ingest",
			serde_json::json!({
				"item_id": item.item_id,
				"event_id": event.event_id,
				"source_id": source.source_id,
				"created_event": created_event,
			}),
		);

		Ok(IngestResponse {
			item_id: item.item_id,
			event_id: event.event_id,
			created_event,
			linked,
			source_reliability: source.reliability,
		})
	}

	/// Tx A: source and item rows, plus the source's item counter and
	/// reliability when the item is new.
	async fn persist_item(
		&self,
		request: &IngestRequest,
		now: OffsetDateTime,
	) -> Result<(Source, Item)> {
		let mut tx = self.db.pool.begin().await?;
		let source = queries::upsert_source(&mut *tx, &NewSource {
			external_id: request.source.external_id.clone(),
			name: request.source.name.clone(),
			kind: request.source.kind.clone().unwrap_or_else(|| "other".to_string()),
			url: request.source.url.clone(),
			category: request.source.category.clone(),
			tags: request.source.tags.clone(),
		})
		.await?;
		let (item, inserted) = queries::upsert_item(&mut *tx, &NewItem {
			source_id: source.source_id,
			external_id: request.external_id.clone(),
			kind: request.kind.clone(),
			title: request.title.clone(),
			content: request.content.clone(),
			summary: request.summary.clone(),
			language: request.language.clone(),
			priority: request.priority.clone(),
			r#type: request.r#type.clone(),
			category: request.category.clone(),
			tags: request.tags.clone(),
			credibility: request.credibility,
			latitude: request.latitude,
			longitude: request.longitude,
			parsed_at: now,
			occurred_at: request.occurred_at,
			raw_url: request.raw_url.clone(),
			media_url: request.media_url.clone(),
			meta: request.meta.clone(),
		})
		.await?;
		let source = if inserted {
			let total_items = source.total_items + 1;
			let score =
				reliability(total_items, source.confirmed_items, source.disproved_items);

			queries::set_source_stats(
				&mut *tx,
				source.source_id,
				total_items,
				source.confirmed_items,
				source.disproved_items,
				score,
			)
			.await?;

			Source { total_items, reliability: score, ..source }
		} else {
			source
		};

		tx.commit().await?;

		Ok((source, item))
	}

	/// Tx B: reuse the surviving candidate or open a fresh event, and queue
	/// index jobs for both documents.
	#[allow(clippy::too_many_arguments)]
	async fn settle_event(
		&self,
		item: &Item,
		classification: Option<&Classification>,
		event_type: &str,
		occurred_at: OffsetDateTime,
		latitude: Option<f64>,
		longitude: Option<f64>,
		candidate: Option<Uuid>,
	) -> Result<(Event, bool)> {
		let mut tx = self.db.pool.begin().await?;
		let reused = match candidate {
			Some(event_id) => queries::touch_event(&mut *tx, event_id).await?,
			None => None,
		};
		let (event, created) = match reused {
			Some(event) => (event, false),
			None => {
				let mut tags = item.tags.clone();

				if let Some(classification) = classification {
					for tag in &classification.tags {
						if !tags.contains(tag) {
							tags.push(tag.clone());
						}
					}
				}

				let event = queries::insert_event(&mut *tx, &NewEvent {
					title: derive_title(item.title.as_deref(), item.summary.as_deref(), &item.content),
					summary: Some(derive_summary(item.summary.as_deref(), &item.content)),
					description: None,
					r#type: event_type.to_string(),
					severity: Severity::from_priority(item.priority.as_deref()).as_str().to_string(),
					latitude,
					longitude,
					occurred_at,
					fingerprint: fingerprint(event_type, occurred_at, latitude, longitude),
					tags,
				})
				.await?;

				(event, true)
			},
		};

		outbox::enqueue(&mut *tx, outbox::DOC_KIND_ITEM, item.item_id).await?;
		outbox::enqueue(&mut *tx, outbox::DOC_KIND_EVENT, event.event_id).await?;

		tx.commit().await?;

		Ok((event, created))
	}

	async fn locate_opt(&self, enabled: bool, text: &str) -> Option<GeoPoint> {
		if !enabled {
			return None;
		}

		match self.providers.geocoder.locate(&self.cfg.providers.geocoder, text).await {
			Ok(point) => point,
			Err(err) => {
				tracing::warn!(error = %err, "Location extraction failed; continuing without coordinates.");

				None
			},
		}
	}

	async fn classify_opt(&self, enabled: bool, text: &str) -> Option<Classification> {
		if !enabled {
			return None;
		}

		match self.providers.classifier.classify(&self.cfg.providers.classifier, text).await {
			Ok(classification) => Some(classification),
			Err(err) => {
				tracing::warn!(error = %err, "Classification failed; continuing without it.");

				None
			},
		}
	}
}

/// The text the embedding and enrichment providers see: title, summary, and
/// content joined in that order.
pub(crate) fn concat_text(item: &Item) -> String {
	[item.title.as_deref(), item.summary.as_deref(), Some(item.content.as_str())]
		.into_iter()
		.flatten()
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("\n")
}
