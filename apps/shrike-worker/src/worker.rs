use std::{collections::HashMap, time::Duration as StdDuration};

use color_eyre::{Result, eyre};
use qdrant_client::{
	client::Payload,
	qdrant::{PointStruct, Value},
};
use serde_json::Value as JsonValue;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::time as tokio_time;
use uuid::Uuid;

use shrike_providers::embedding;
use shrike_storage::{
	db::Db,
	models::{Event, IndexOutboxEntry, Item},
	outbox::{self, DOC_KIND_EVENT, DOC_KIND_ITEM},
	qdrant::QdrantStore,
	queries,
};

const POLL_INTERVAL_MS: i64 = 500;
const CLAIM_LEASE_SECONDS: i64 = 30;
const BASE_BACKOFF_MS: i64 = 500;
const MAX_BACKOFF_MS: i64 = 30_000;
const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;

pub struct WorkerState {
	pub db: Db,
	pub qdrant: QdrantStore,
	pub embedding: shrike_config::EmbeddingProviderConfig,
}

pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		if let Err(err) = process_outbox_once(&state).await {
			tracing::error!(error = %err, "Index outbox processing failed.");
		}

		tokio_time::sleep(to_std_duration(Duration::milliseconds(POLL_INTERVAL_MS))).await;
	}
}

async fn process_outbox_once(state: &WorkerState) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let job = outbox::claim_next(&state.db, now, CLAIM_LEASE_SECONDS).await?;
	let Some(job) = job else {
		return Ok(());
	};
	let result = match job.op.as_str() {
		"UPSERT" => handle_upsert(state, &job).await,
		other => Err(eyre::eyre!("Unsupported outbox op: {other}.")),
	};

	match result {
		Ok(()) => {
			outbox::mark_done(&state.db, job.outbox_id, OffsetDateTime::now_utc()).await?;
		},
		Err(err) => {
			mark_failed(&state.db, &job, &err).await?;
			tracing::error!(error = %err, outbox_id = %job.outbox_id, "Outbox job failed.");
		},
	}

	Ok(())
}

async fn handle_upsert(state: &WorkerState, job: &IndexOutboxEntry) -> Result<()> {
	match job.doc_kind.as_str() {
		DOC_KIND_ITEM => index_item(state, job.doc_id).await,
		DOC_KIND_EVENT => index_event(state, job.doc_id).await,
		other => Err(eyre::eyre!("Unsupported outbox doc kind: {other}.")),
	}
}

async fn index_item(state: &WorkerState, item_id: Uuid) -> Result<()> {
	let item = queries::get_item(&state.db.pool, item_id).await?;
	let Some(item) = item else {
		tracing::info!(item_id = %item_id, "Item missing for outbox job. Marking done.");

		return Ok(());
	};
	let vector = embed_text(state, &item_text(&item)).await?;
	let payload = item_payload(&item)?;
	let point = PointStruct::new(item.item_id.to_string(), vector, payload);

	state.qdrant.upsert_point(point).await?;

	Ok(())
}

async fn index_event(state: &WorkerState, event_id: Uuid) -> Result<()> {
	let event = queries::get_event(&state.db.pool, event_id).await?;
	let Some(event) = event else {
		tracing::info!(event_id = %event_id, "Event missing for outbox job. Marking done.");

		return Ok(());
	};
	let vector = embed_text(state, &event_text(&event)).await?;
	let payload = event_payload(&event)?;
	let point = PointStruct::new(event.event_id.to_string(), vector, payload);

	state.qdrant.upsert_point(point).await?;

	Ok(())
}

async fn embed_text(state: &WorkerState, text: &str) -> Result<Vec<f32>> {
	let vector = embedding::embed_one(&state.embedding, text).await?;

	validate_vector_dim(&vector, state.qdrant.vector_dim)?;

	Ok(vector)
}

fn item_text(item: &Item) -> String {
	let mut parts = Vec::new();

	if let Some(title) = item.title.as_deref()
		&& !title.trim().is_empty()
	{
		parts.push(title.trim().to_string());
	}
	if let Some(summary) = item.summary.as_deref()
		&& !summary.trim().is_empty()
	{
		parts.push(summary.trim().to_string());
	}

	parts.push(item.content.trim().to_string());

	parts.join("\n")
}

fn event_text(event: &Event) -> String {
	let mut parts = vec![event.title.trim().to_string()];

	if let Some(summary) = event.summary.as_deref()
		&& !summary.trim().is_empty()
	{
		parts.push(summary.trim().to_string());
	}
	if let Some(description) = event.description.as_deref()
		&& !description.trim().is_empty()
	{
		parts.push(description.trim().to_string());
	}

	parts.join("\n")
}

fn item_payload(item: &Item) -> Result<Payload> {
	let mut payload_map = HashMap::new();

	payload_map.insert("doc_kind".to_string(), Value::from(DOC_KIND_ITEM.to_string()));
	payload_map.insert("doc_id".to_string(), Value::from(item.item_id.to_string()));
	payload_map.insert("type".to_string(), Value::from(item.r#type.clone().unwrap_or_default()));
	payload_map.insert(
		"occurred_at".to_string(),
		Value::from(JsonValue::String(format_timestamp(item.occurred_at.unwrap_or(item.parsed_at))?)),
	);
	insert_opt_f64(&mut payload_map, "latitude", item.latitude);
	insert_opt_f64(&mut payload_map, "longitude", item.longitude);
	payload_map.insert("title".to_string(), Value::from(item.title.clone().unwrap_or_default()));

	Ok(Payload::from(payload_map))
}

fn event_payload(event: &Event) -> Result<Payload> {
	let mut payload_map = HashMap::new();

	payload_map.insert("doc_kind".to_string(), Value::from(DOC_KIND_EVENT.to_string()));
	payload_map.insert("doc_id".to_string(), Value::from(event.event_id.to_string()));
	payload_map.insert("type".to_string(), Value::from(event.r#type.clone()));
	payload_map.insert(
		"occurred_at".to_string(),
		Value::from(JsonValue::String(format_timestamp(event.occurred_at)?)),
	);
	insert_opt_f64(&mut payload_map, "latitude", event.latitude);
	insert_opt_f64(&mut payload_map, "longitude", event.longitude);
	payload_map.insert("status".to_string(), Value::from(event.status.clone()));
	payload_map.insert("title".to_string(), Value::from(event.title.clone()));

	Ok(Payload::from(payload_map))
}

fn insert_opt_f64(payload_map: &mut HashMap<String, Value>, key: &str, value: Option<f64>) {
	payload_map.insert(
		key.to_string(),
		match value {
			Some(value) => Value::from(JsonValue::from(value)),
			None => Value::from(JsonValue::Null),
		},
	);
}

fn format_timestamp(ts: OffsetDateTime) -> Result<String> {
	ts.format(&Rfc3339).map_err(|_| eyre::eyre!("Failed to format timestamp."))
}

fn validate_vector_dim(vec: &[f32], expected_dim: u32) -> Result<()> {
	if vec.len() != expected_dim as usize {
		return Err(eyre::eyre!(
			"Embedding dimension {} does not match configured vector_dim {}.",
			vec.len(),
			expected_dim
		));
	}

	Ok(())
}

async fn mark_failed(db: &Db, job: &IndexOutboxEntry, err: &color_eyre::Report) -> Result<()> {
	let next_attempts = job.attempts.saturating_add(1);
	let backoff = backoff_for_attempt(next_attempts);
	let now = OffsetDateTime::now_utc();
	let available_at = now + backoff;
	let error_text = sanitize_outbox_error(&err.to_string());

	outbox::mark_failed(db, job.outbox_id, next_attempts, &error_text, available_at, now).await?;

	Ok(())
}

fn sanitize_outbox_error(text: &str) -> String {
	let mut parts = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		let mut word = raw.to_string();

		if redact_next {
			word = "[REDACTED]".to_string();
			redact_next = false;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
		}

		let lowered = raw.to_ascii_lowercase();

		for key in ["api_key", "apikey", "password", "secret", "token"] {
			if lowered.contains(key) && (lowered.contains('=') || lowered.contains(':')) {
				let sep = if raw.contains('=') { '=' } else { ':' };
				let prefix = match raw.split(sep).next() {
					Some(prefix) => prefix,
					None => raw,
				};

				word = format!("{prefix}{sep}[REDACTED]");

				break;
			}
		}

		parts.push(word);
	}

	let mut out = parts.join(" ");

	if out.chars().count() > MAX_OUTBOX_ERROR_CHARS {
		out = out.chars().take(MAX_OUTBOX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

fn backoff_for_attempt(attempt: i32) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(6);
	let base = BASE_BACKOFF_MS.saturating_mul(1 << exp);
	let capped = base.min(MAX_BACKOFF_MS);

	Duration::milliseconds(capped)
}

fn to_std_duration(duration: Duration) -> StdDuration {
	let millis = duration.whole_milliseconds();

	if millis <= 0 {
		return StdDuration::from_millis(0);
	}

	StdDuration::from_millis(millis as u64)
}
