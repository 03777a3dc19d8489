use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{fingerprint::normalize_type, geo::haversine_km};

/// The freshly ingested item, reduced to the fields the merge filter needs.
#[derive(Debug, Clone)]
pub struct DedupQuery {
	pub event_type: String,
	pub occurred_at: OffsetDateTime,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
}

/// One nearest-neighbor hit with the payload fields we index alongside the
/// vector. Any field the payload lacked arrives as `None`.
#[derive(Debug, Clone)]
pub struct DedupCandidate {
	pub event_id: Uuid,
	pub score: f32,
	pub occurred_at: Option<OffsetDateTime>,
	pub event_type: Option<String>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
}

/// Merge cutoffs. Defaults mirror the shipped configuration.
#[derive(Debug, Clone, Copy)]
pub struct DedupRules {
	pub sim_threshold: f32,
	pub time_window_minutes: i64,
	pub geo_radius_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeTarget {
	pub event_id: Uuid,
	pub score: f32,
}

/// Picks the event the item should merge into, or `None` to create a fresh
/// one. A candidate survives only if it clears the similarity threshold,
/// carries a parseable timestamp inside the time window, matches the query
/// type (an empty candidate type is a wildcard), and sits within the geo
/// radius when both sides have coordinates. Highest score wins; ties keep
/// first-seen order.
pub fn pick_candidate(
	query: &DedupQuery,
	candidates: &[DedupCandidate],
	rules: &DedupRules,
) -> Option<MergeTarget> {
	let query_type = normalize_type(&query.event_type);
	let mut best: Option<MergeTarget> = None;

	for candidate in candidates {
		if candidate.score < rules.sim_threshold {
			continue;
		}
		let Some(candidate_at) = candidate.occurred_at else {
			continue;
		};
		if (query.occurred_at - candidate_at).abs() > Duration::minutes(rules.time_window_minutes) {
			continue;
		}
		if let Some(candidate_type) = candidate.event_type.as_deref() {
			let candidate_type = candidate_type.trim();

			if !candidate_type.is_empty() && normalize_type(candidate_type) != query_type {
				continue;
			}
		}
		if let (Some(q_lat), Some(q_lon), Some(c_lat), Some(c_lon)) =
			(query.latitude, query.longitude, candidate.latitude, candidate.longitude)
			&& haversine_km(q_lat, q_lon, c_lat, c_lon) > rules.geo_radius_km
		{
			continue;
		}
		if best.is_none_or(|current| candidate.score > current.score) {
			best = Some(MergeTarget { event_id: candidate.event_id, score: candidate.score });
		}
	}

	best
}

#[cfg(test)]
mod tests {
	use time::Duration;
	use time::macros::datetime;

	use super::*;

	const RULES: DedupRules =
		DedupRules { sim_threshold: 0.35, time_window_minutes: 180, geo_radius_km: 25.0 };

	fn query() -> DedupQuery {
		DedupQuery {
			event_type: "strike".to_string(),
			occurred_at: datetime!(2025-06-01 12:00 UTC),
			latitude: Some(50.45),
			longitude: Some(30.52),
		}
	}

	fn candidate(score: f32) -> DedupCandidate {
		DedupCandidate {
			event_id: Uuid::new_v4(),
			score,
			occurred_at: Some(datetime!(2025-06-01 11:00 UTC)),
			event_type: Some("strike".to_string()),
			latitude: Some(50.46),
			longitude: Some(30.53),
		}
	}

	#[test]
	fn similarity_threshold_is_a_hard_cut() {
		assert!(pick_candidate(&query(), &[candidate(0.34)], &RULES).is_none());
		assert!(pick_candidate(&query(), &[candidate(0.36)], &RULES).is_some());
	}

	#[test]
	fn stale_candidates_are_rejected_even_at_high_similarity() {
		let mut far = candidate(0.99);
		far.occurred_at = Some(datetime!(2025-06-01 12:00 UTC) - Duration::minutes(200));

		assert!(pick_candidate(&query(), &[far], &RULES).is_none());
	}

	#[test]
	fn time_window_counts_seconds_not_whole_minutes() {
		let mut over = candidate(0.9);
		over.occurred_at =
			Some(datetime!(2025-06-01 12:00 UTC) + Duration::minutes(180) + Duration::seconds(54));

		assert!(pick_candidate(&query(), &[over], &RULES).is_none());

		let mut edge = candidate(0.9);
		edge.occurred_at = Some(datetime!(2025-06-01 12:00 UTC) + Duration::minutes(180));

		assert!(pick_candidate(&query(), &[edge], &RULES).is_some());
	}

	#[test]
	fn unparseable_timestamp_disqualifies() {
		let mut broken = candidate(0.9);
		broken.occurred_at = None;

		assert!(pick_candidate(&query(), &[broken], &RULES).is_none());
	}

	#[test]
	fn empty_candidate_type_is_a_wildcard() {
		let mut untyped = candidate(0.6);
		untyped.event_type = Some(String::new());
		let mut other = candidate(0.6);
		other.event_type = Some("protest".to_string());

		assert!(pick_candidate(&query(), &[untyped], &RULES).is_some());
		assert!(pick_candidate(&query(), &[other], &RULES).is_none());
	}

	#[test]
	fn distant_candidates_are_cut_when_both_sides_have_coordinates() {
		let mut far = candidate(0.9);
		// Roughly 70 km north of the query point.
		far.latitude = Some(51.08);

		assert!(pick_candidate(&query(), &[far], &RULES).is_none());

		// A candidate without coordinates skips the geo cut.
		let mut unlocated = candidate(0.9);
		unlocated.latitude = None;
		unlocated.longitude = None;

		assert!(pick_candidate(&query(), &[unlocated], &RULES).is_some());
	}

	#[test]
	fn highest_score_wins_and_ties_keep_first_seen() {
		let low = candidate(0.5);
		let high = candidate(0.8);
		let tied = DedupCandidate { event_id: Uuid::new_v4(), ..high.clone() };

		let picked = pick_candidate(&query(), &[low.clone(), high.clone()], &RULES).unwrap();
		assert_eq!(picked.event_id, high.event_id);

		let picked = pick_candidate(&query(), &[high.clone(), tied], &RULES).unwrap();
		assert_eq!(picked.event_id, high.event_id);
	}
}
