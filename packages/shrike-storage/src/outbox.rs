use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, db::Db, models::IndexOutboxEntry};

pub const DOC_KIND_ITEM: &str = "item";
pub const DOC_KIND_EVENT: &str = "event";

/// Queues a document for index synchronization. Runs inside the transaction
/// that mutated the document so a job exists exactly when the row does.
pub async fn enqueue<'e, E>(executor: E, doc_kind: &str, doc_id: Uuid) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO index_outbox (outbox_id, doc_kind, doc_id, op, status)
VALUES ($1, $2, $3, 'UPSERT', 'PENDING')",
	)
	.bind(Uuid::new_v4())
	.bind(doc_kind)
	.bind(doc_id)
	.execute(executor)
	.await?;

	Ok(())
}

/// Claims the oldest runnable job and leases it. The lease keeps a crashed
/// worker from parking the job forever.
pub async fn claim_next(
	db: &Db,
	now: OffsetDateTime,
	lease_seconds: i64,
) -> Result<Option<IndexOutboxEntry>> {
	let mut tx = db.pool.begin().await?;
	let row = sqlx::query_as::<_, IndexOutboxEntry>(
		"\
SELECT *
FROM index_outbox
WHERE status IN ('PENDING','FAILED','CLAIMED') AND available_at <= $1
ORDER BY available_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
	)
	.bind(now)
	.fetch_optional(&mut *tx)
	.await?;
	let job = if let Some(mut job) = row {
		let lease_until = now + time::Duration::seconds(lease_seconds);

		sqlx::query(
			"UPDATE index_outbox SET status = 'CLAIMED', available_at = $1, updated_at = $2 WHERE outbox_id = $3",
		)
		.bind(lease_until)
		.bind(now)
		.bind(job.outbox_id)
		.execute(&mut *tx)
		.await?;

		job.available_at = lease_until;
		job.updated_at = now;

		Some(job)
	} else {
		None
	};

	tx.commit().await?;

	Ok(job)
}

pub async fn mark_done(db: &Db, outbox_id: Uuid, now: OffsetDateTime) -> Result<()> {
	sqlx::query("UPDATE index_outbox SET status = 'DONE', updated_at = $1 WHERE outbox_id = $2")
		.bind(now)
		.bind(outbox_id)
		.execute(&db.pool)
		.await?;

	Ok(())
}

pub async fn mark_failed(
	db: &Db,
	outbox_id: Uuid,
	attempts: i32,
	error_text: &str,
	available_at: OffsetDateTime,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE index_outbox
SET status = 'FAILED',
\tattempts = $1,
\tlast_error = $2,
\tavailable_at = $3,
\tupdated_at = $4
WHERE outbox_id = $5",
	)
	.bind(attempts)
	.bind(error_text)
	.bind(available_at)
	.bind(now)
	.bind(outbox_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}
