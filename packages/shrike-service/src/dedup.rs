use qdrant_client::qdrant::{ScoredPoint, point_id::PointIdOptions, value::Kind};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use shrike_domain::{DedupCandidate, DedupQuery, DedupRules, MergeTarget, pick_candidate};

use crate::ShrikeService;

impl ShrikeService {
	/// Finds the event the item should merge into, if any. Embedding or index
	/// failures degrade to "no candidate" so ingestion never stalls on the
	/// vector path.
	pub(crate) async fn resolve_candidate(
		&self,
		text: &str,
		query: &DedupQuery,
	) -> Option<MergeTarget> {
		let cfg = &self.cfg.providers.embedding;
		let vector = match self.providers.embedding.embed(cfg, &[text.to_string()]).await {
			Ok(mut vectors) if !vectors.is_empty() => vectors.remove(0),
			Ok(_) => {
				tracing::warn!("Embedding provider returned no vectors; skipping dedup.");

				return None;
			},
			Err(err) => {
				tracing::warn!(error = %err, "Embedding failed; skipping dedup.");

				return None;
			},
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			tracing::warn!(
				got = vector.len(),
				want = self.cfg.storage.qdrant.vector_dim,
				"Embedding dimension mismatch; skipping dedup."
			);

			return None;
		}

		let points = match self.qdrant.search_events(vector, self.cfg.dedup.candidate_k).await {
			Ok(points) => points,
			Err(err) => {
				tracing::warn!(error = %err, "Qdrant search failed; skipping dedup.");

				return None;
			},
		};
		let candidates = points.iter().filter_map(candidate_from_point).collect::<Vec<_>>();
		let rules = DedupRules {
			sim_threshold: self.cfg.dedup.sim_threshold,
			time_window_minutes: self.cfg.dedup.time_window_minutes,
			geo_radius_km: self.cfg.dedup.geo_radius_km,
		};

		pick_candidate(query, &candidates, &rules)
	}
}

fn candidate_from_point(point: &ScoredPoint) -> Option<DedupCandidate> {
	let event_id = match point.id.as_ref()?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(raw) => Uuid::parse_str(raw).ok()?,
		PointIdOptions::Num(_) => return None,
	};
	let occurred_at = payload_str(point, "occurred_at")
		.and_then(|raw| OffsetDateTime::parse(&raw, &Rfc3339).ok());

	Some(DedupCandidate {
		event_id,
		score: point.score,
		occurred_at,
		event_type: payload_str(point, "type"),
		latitude: payload_f64(point, "latitude"),
		longitude: payload_f64(point, "longitude"),
	})
}

fn payload_str(point: &ScoredPoint, key: &str) -> Option<String> {
	match point.payload.get(key)?.kind.as_ref()? {
		Kind::StringValue(value) => Some(value.clone()),
		_ => None,
	}
}

fn payload_f64(point: &ScoredPoint, key: &str) -> Option<f64> {
	match point.payload.get(key)?.kind.as_ref()? {
		Kind::DoubleValue(value) => Some(*value),
		Kind::IntegerValue(value) => Some(*value as f64),
		_ => None,
	}
}
