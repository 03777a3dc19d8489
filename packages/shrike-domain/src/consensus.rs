use crate::verdict::EventStatus;

/// Status an event should carry given the verdict tallies of its linked
/// items. Conflicting verdicts keep the event pending.
pub fn consensus_status(confirmed: i64, disproved: i64) -> EventStatus {
	if confirmed > 0 && disproved == 0 {
		EventStatus::Confirmed
	} else if disproved > 0 && confirmed == 0 {
		EventStatus::Disproved
	} else {
		EventStatus::Pending
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unanimous_verdicts_settle_the_status() {
		assert_eq!(consensus_status(3, 0), EventStatus::Confirmed);
		assert_eq!(consensus_status(0, 2), EventStatus::Disproved);
	}

	#[test]
	fn conflict_or_silence_stays_pending() {
		assert_eq!(consensus_status(0, 0), EventStatus::Pending);
		assert_eq!(consensus_status(2, 1), EventStatus::Pending);
	}
}
