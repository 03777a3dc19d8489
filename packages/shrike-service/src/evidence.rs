use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use shrike_storage::queries;

use crate::{Error, Result, ShrikeService, time_serde};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceEntry {
	pub item_id: Uuid,
	pub relation: String,
	pub weight: Option<f64>,
	#[serde(with = "time_serde")]
	pub linked_at: OffsetDateTime,
	pub item_external_id: String,
	pub item_title: Option<String>,
	pub item_credibility: Option<f64>,
	pub item_verdict: Option<String>,
	pub source_name: String,
	pub source_reliability: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceResponse {
	pub event_id: Uuid,
	pub status: String,
	pub evidence: Vec<EvidenceEntry>,
}

impl ShrikeService {
	/// The event's evidence trail: every linked item with its verdict and the
	/// reliability of the source that carried it.
	pub async fn list_evidence(&self, event_id: Uuid) -> Result<EvidenceResponse> {
		let Some(event) = queries::get_event(&self.db.pool, event_id).await? else {
			return Err(Error::NotFound { message: format!("Event {event_id} does not exist.") });
		};
		let evidence = queries::list_evidence(&self.db.pool, event_id)
			.await?
			.into_iter()
			.map(|record| EvidenceEntry {
				item_id: record.item_id,
				relation: record.relation,
				weight: record.weight,
				linked_at: record.created_at,
				item_external_id: record.item_external_id,
				item_title: record.item_title,
				item_credibility: record.item_credibility,
				item_verdict: record.item_verdict,
				source_name: record.source_name,
				source_reliability: record.source_reliability,
			})
			.collect();

		Ok(EvidenceResponse { event_id, status: event.status, evidence })
	}
}
