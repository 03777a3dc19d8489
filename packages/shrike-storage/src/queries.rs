use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Result,
	models::{Event, EvidenceRecord, Item, NewEvent, NewItem, NewSource, Source},
};

/// Creates the source on first contact or refreshes its descriptive fields.
/// Reliability and counters are never touched here.
pub async fn upsert_source<'e, E>(executor: E, new: &NewSource) -> Result<Source>
where
	E: PgExecutor<'e>,
{
	let source = sqlx::query_as::<_, Source>(
		"\
INSERT INTO sources (source_id, external_id, name, kind, url, category, tags)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (external_id) DO UPDATE SET
	name = EXCLUDED.name,
	kind = EXCLUDED.kind,
	url = COALESCE(EXCLUDED.url, sources.url),
	category = COALESCE(EXCLUDED.category, sources.category),
	tags = EXCLUDED.tags,
	updated_at = now()
RETURNING *",
	)
	.bind(Uuid::new_v4())
	.bind(new.external_id.as_str())
	.bind(new.name.as_str())
	.bind(new.kind.as_str())
	.bind(new.url.as_deref())
	.bind(new.category.as_deref())
	.bind(&new.tags)
	.fetch_one(executor)
	.await?;

	Ok(source)
}

#[derive(sqlx::FromRow)]
struct UpsertedItemRow {
	#[sqlx(flatten)]
	item: Item,
	inserted: bool,
}

/// Upserts an item by its external key. Re-ingestion refreshes content fields
/// but never the review blob in meta. The returned flag is true when the row
/// is new.
pub async fn upsert_item<'e, E>(executor: E, new: &NewItem) -> Result<(Item, bool)>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, UpsertedItemRow>(
		"\
INSERT INTO items (
	item_id, source_id, external_id, kind, title, content, summary, language,
	priority, type, category, tags, credibility, latitude, longitude,
	parsed_at, occurred_at, raw_url, media_url, meta
)
VALUES (
	$1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
	$11, $12, $13, $14, $15, $16, $17, $18, $19, $20
)
ON CONFLICT (external_id) DO UPDATE SET
	kind = EXCLUDED.kind,
	title = EXCLUDED.title,
	content = EXCLUDED.content,
	summary = EXCLUDED.summary,
	language = EXCLUDED.language,
	priority = EXCLUDED.priority,
	type = EXCLUDED.type,
	category = EXCLUDED.category,
	tags = EXCLUDED.tags,
	credibility = EXCLUDED.credibility,
	latitude = EXCLUDED.latitude,
	longitude = EXCLUDED.longitude,
	occurred_at = EXCLUDED.occurred_at,
	raw_url = EXCLUDED.raw_url,
	media_url = EXCLUDED.media_url,
	meta = CASE
		WHEN items.meta ? 'review'
			THEN EXCLUDED.meta || jsonb_build_object('review', items.meta -> 'review')
		ELSE EXCLUDED.meta
	END,
	updated_at = now()
RETURNING *, (xmax = 0) AS inserted",
	)
	.bind(Uuid::new_v4())
	.bind(new.source_id)
	.bind(new.external_id.as_str())
	.bind(new.kind.as_str())
	.bind(new.title.as_deref())
	.bind(new.content.as_str())
	.bind(new.summary.as_deref())
	.bind(new.language.as_deref())
	.bind(new.priority.as_deref())
	.bind(new.r#type.as_deref())
	.bind(new.category.as_deref())
	.bind(&new.tags)
	.bind(new.credibility)
	.bind(new.latitude)
	.bind(new.longitude)
	.bind(new.parsed_at)
	.bind(new.occurred_at)
	.bind(new.raw_url.as_deref())
	.bind(new.media_url.as_deref())
	.bind(&new.meta)
	.fetch_one(executor)
	.await?;

	Ok((row.item, row.inserted))
}

pub async fn get_item<'e, E>(executor: E, item_id: Uuid) -> Result<Option<Item>>
where
	E: PgExecutor<'e>,
{
	let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE item_id = $1")
		.bind(item_id)
		.fetch_optional(executor)
		.await?;

	Ok(item)
}

/// Row-locked read used by adjudication to serialize verdict transitions.
pub async fn get_item_for_update<'e, E>(executor: E, item_id: Uuid) -> Result<Option<Item>>
where
	E: PgExecutor<'e>,
{
	let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE item_id = $1 FOR UPDATE")
		.bind(item_id)
		.fetch_optional(executor)
		.await?;

	Ok(item)
}

pub async fn set_item_verdict<'e, E>(
	executor: E,
	item_id: Uuid,
	verdict: &str,
	reviewed_at: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE items
SET meta = jsonb_set(
		meta,
		'{review}',
		jsonb_build_object('verdict', $2::text, 'reviewed_at', $3::text)
	),
	updated_at = now()
WHERE item_id = $1",
	)
	.bind(item_id)
	.bind(verdict)
	.bind(reviewed_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_source_for_update<'e, E>(executor: E, source_id: Uuid) -> Result<Option<Source>>
where
	E: PgExecutor<'e>,
{
	let source =
		sqlx::query_as::<_, Source>("SELECT * FROM sources WHERE source_id = $1 FOR UPDATE")
			.bind(source_id)
			.fetch_optional(executor)
			.await?;

	Ok(source)
}

pub async fn set_source_stats<'e, E>(
	executor: E,
	source_id: Uuid,
	total_items: i64,
	confirmed_items: i64,
	disproved_items: i64,
	reliability: f64,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE sources
SET total_items = $2,
	confirmed_items = $3,
	disproved_items = $4,
	reliability = $5,
	updated_at = now()
WHERE source_id = $1",
	)
	.bind(source_id)
	.bind(total_items)
	.bind(confirmed_items)
	.bind(disproved_items)
	.bind(reliability)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_event<'e, E>(executor: E, new: &NewEvent) -> Result<Event>
where
	E: PgExecutor<'e>,
{
	let event = sqlx::query_as::<_, Event>(
		"\
INSERT INTO events (
	event_id, title, summary, description, type, severity, status,
	latitude, longitude, occurred_at, fingerprint, tags
)
VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9, $10, $11)
RETURNING *",
	)
	.bind(Uuid::new_v4())
	.bind(new.title.as_str())
	.bind(new.summary.as_deref())
	.bind(new.description.as_deref())
	.bind(new.r#type.as_str())
	.bind(new.severity.as_str())
	.bind(new.latitude)
	.bind(new.longitude)
	.bind(new.occurred_at)
	.bind(new.fingerprint.as_str())
	.bind(&new.tags)
	.fetch_one(executor)
	.await?;

	Ok(event)
}

pub async fn get_event<'e, E>(executor: E, event_id: Uuid) -> Result<Option<Event>>
where
	E: PgExecutor<'e>,
{
	let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE event_id = $1")
		.bind(event_id)
		.fetch_optional(executor)
		.await?;

	Ok(event)
}

/// Marks an existing event as freshly corroborated. Returns `None` when the
/// candidate vanished between the index lookup and this write.
pub async fn touch_event<'e, E>(executor: E, event_id: Uuid) -> Result<Option<Event>>
where
	E: PgExecutor<'e>,
{
	let event = sqlx::query_as::<_, Event>(
		"UPDATE events SET updated_at = now() WHERE event_id = $1 RETURNING *",
	)
	.bind(event_id)
	.fetch_optional(executor)
	.await?;

	Ok(event)
}

pub async fn set_event_status<'e, E>(executor: E, event_id: Uuid, status: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("UPDATE events SET status = $2, updated_at = now() WHERE event_id = $1")
		.bind(event_id)
		.bind(status)
		.execute(executor)
		.await?;

	Ok(())
}

/// Idempotent evidence attach. Returns true when a new link was created.
pub async fn attach_evidence<'e, E>(
	executor: E,
	event_id: Uuid,
	item_id: Uuid,
	relation: &str,
	weight: Option<f64>,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO evidence_links (event_id, item_id, relation, weight)
VALUES ($1, $2, $3, $4)
ON CONFLICT (event_id, item_id) DO NOTHING",
	)
	.bind(event_id)
	.bind(item_id)
	.bind(relation)
	.bind(weight)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub async fn events_linked_to_item<'e, E>(executor: E, item_id: Uuid) -> Result<Vec<Uuid>>
where
	E: PgExecutor<'e>,
{
	let event_ids = sqlx::query_scalar::<_, Uuid>(
		"SELECT event_id FROM evidence_links WHERE item_id = $1 ORDER BY created_at",
	)
	.bind(item_id)
	.fetch_all(executor)
	.await?;

	Ok(event_ids)
}

pub async fn event_statuses_for_item<'e, E>(
	executor: E,
	item_id: Uuid,
) -> Result<Vec<(Uuid, String)>>
where
	E: PgExecutor<'e>,
{
	let statuses = sqlx::query_as::<_, (Uuid, String)>(
		"\
SELECT e.event_id, e.status
FROM evidence_links l
JOIN events e ON e.event_id = l.event_id
WHERE l.item_id = $1
ORDER BY l.created_at",
	)
	.bind(item_id)
	.fetch_all(executor)
	.await?;

	Ok(statuses)
}

/// Confirmed and disproved tallies over an event's linked items.
pub async fn evidence_verdict_counts<'e, E>(executor: E, event_id: Uuid) -> Result<(i64, i64)>
where
	E: PgExecutor<'e>,
{
	let counts = sqlx::query_as::<_, (i64, i64)>(
		"\
SELECT
	COUNT(*) FILTER (WHERE i.meta #>> '{review,verdict}' = 'confirmed'),
	COUNT(*) FILTER (WHERE i.meta #>> '{review,verdict}' = 'disproved')
FROM evidence_links l
JOIN items i ON i.item_id = l.item_id
WHERE l.event_id = $1",
	)
	.bind(event_id)
	.fetch_one(executor)
	.await?;

	Ok(counts)
}

pub async fn list_evidence<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<EvidenceRecord>>
where
	E: PgExecutor<'e>,
{
	let records = sqlx::query_as::<_, EvidenceRecord>(
		"\
SELECT
	l.event_id,
	l.item_id,
	l.relation,
	l.weight,
	l.created_at,
	i.external_id AS item_external_id,
	i.title AS item_title,
	i.credibility AS item_credibility,
	i.meta #>> '{review,verdict}' AS item_verdict,
	s.name AS source_name,
	s.reliability AS source_reliability
FROM evidence_links l
JOIN items i ON i.item_id = l.item_id
JOIN sources s ON s.source_id = i.source_id
WHERE l.event_id = $1
ORDER BY l.created_at ASC",
	)
	.bind(event_id)
	.fetch_all(executor)
	.await?;

	Ok(records)
}
