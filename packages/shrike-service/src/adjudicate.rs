use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use shrike_domain::{Verdict, consensus_status, reliability, shift_counters};
use shrike_storage::queries;

use crate::{Error, Result, ShrikeService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdjudicateRequest {
	pub verdict: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdatedEvent {
	pub event_id: Uuid,
	pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdjudicateResponse {
	pub item_id: Uuid,
	pub verdict: String,
	pub source_reliability: f64,
	pub updated_events: Vec<UpdatedEvent>,
}

impl ShrikeService {
	/// Records a human verdict on an item and propagates it: source counters
	/// and reliability shift by the transition, and every linked event gets
	/// its consensus status recomputed. All of it commits atomically.
	pub async fn adjudicate(&self, item_id: Uuid, request: AdjudicateRequest) -> Result<AdjudicateResponse> {
		let Some(next) = Verdict::parse(&request.verdict) else {
			return Err(Error::InvalidRequest {
				message: format!(
					"Verdict must be one of confirmed, disproved, unknown; got {:?}.",
					request.verdict
				),
			});
		};
		let mut tx = self.db.pool.begin().await?;
		// Row locks go source first, then item, the same order ingestion takes
		// them. An unlocked read resolves the source id; it never changes once
		// the item exists.
		let Some(unlocked) = queries::get_item(&mut *tx, item_id).await? else {
			return Err(Error::NotFound { message: format!("Item {item_id} does not exist.") });
		};
		let Some(source) = queries::get_source_for_update(&mut *tx, unlocked.source_id).await?
		else {
			return Err(Error::NotFound {
				message: format!("Source {} does not exist.", unlocked.source_id),
			});
		};
		let Some(item) = queries::get_item_for_update(&mut *tx, item_id).await? else {
			return Err(Error::NotFound { message: format!("Item {item_id} does not exist.") });
		};
		let previous = item.review_verdict().and_then(Verdict::parse).unwrap_or(Verdict::Unknown);

		if previous == next {
			// Repeating a verdict must not drift the counters.
			let updated_events = queries::event_statuses_for_item(&mut *tx, item_id)
				.await?
				.into_iter()
				.map(|(event_id, status)| UpdatedEvent { event_id, status })
				.collect();

			tx.commit().await?;

			return Ok(AdjudicateResponse {
				item_id,
				verdict: next.as_str().to_string(),
				source_reliability: source.reliability,
				updated_events,
			});
		}

		let reviewed_at = OffsetDateTime::now_utc()
			.format(&Rfc3339)
			.map_err(|err| Error::Storage { message: err.to_string() })?;

		queries::set_item_verdict(&mut *tx, item_id, next.as_str(), &reviewed_at).await?;

		let (confirmed_items, disproved_items) =
			shift_counters(previous, next, source.confirmed_items, source.disproved_items);
		let source_reliability =
			reliability(source.total_items, confirmed_items, disproved_items);

		queries::set_source_stats(
			&mut *tx,
			source.source_id,
			source.total_items,
			confirmed_items,
			disproved_items,
			source_reliability,
		)
		.await?;

		let mut updated_events = Vec::new();

		for event_id in queries::events_linked_to_item(&mut *tx, item_id).await? {
			let (confirmed, disproved) = queries::evidence_verdict_counts(&mut *tx, event_id).await?;
			let status = consensus_status(confirmed, disproved);

			queries::set_event_status(&mut *tx, event_id, status.as_str()).await?;
			updated_events.push(UpdatedEvent { event_id, status: status.as_str().to_string() });
		}

		tx.commit().await?;

		self.publisher.publish(
			"adjudicate",
			serde_json::json!({
				"item_id": item_id,
				"verdict": next.as_str(),
				"source_reliability": source_reliability,
				"updated_events": updated_events
					.iter()
					.map(|e| serde_json::json!({ "event_id": e.event_id, "status": e.status }))
					.collect::<Vec<_>>(),
			}),
		);

		Ok(AdjudicateResponse {
			item_id,
			verdict: next.as_str().to_string(),
			source_reliability,
			updated_events,
		})
	}
}
