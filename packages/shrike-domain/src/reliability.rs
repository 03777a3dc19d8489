use crate::verdict::Verdict;

/// Fraction of reviewed items confirmed, with unreviewed items counting half.
/// A source with no items keeps the neutral 0.5 prior.
pub fn reliability(total_items: i64, confirmed_items: i64, disproved_items: i64) -> f64 {
	if total_items <= 0 {
		return 0.5;
	}

	let grey = (total_items - confirmed_items - disproved_items).max(0);
	let score = (confirmed_items as f64 + 0.5 * grey as f64) / total_items as f64;

	score.clamp(0.0, 1.0)
}

/// Applies a verdict transition to a source's confirmed/disproved counters.
/// Counters never go below zero even if the stored state drifted.
pub fn shift_counters(
	previous: Verdict,
	next: Verdict,
	confirmed_items: i64,
	disproved_items: i64,
) -> (i64, i64) {
	let mut confirmed = confirmed_items;
	let mut disproved = disproved_items;

	match previous {
		Verdict::Confirmed => confirmed = (confirmed - 1).max(0),
		Verdict::Disproved => disproved = (disproved - 1).max(0),
		Verdict::Unknown => {}
	}
	match next {
		Verdict::Confirmed => confirmed += 1,
		Verdict::Disproved => disproved += 1,
		Verdict::Unknown => {}
	}

	(confirmed, disproved)
}
