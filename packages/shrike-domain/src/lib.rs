//! Pure domain rules for event correlation: fingerprinting, deduplication,
//! source reliability, consensus, and derived titles. No I/O lives here.

pub mod consensus;
pub mod dedup;
pub mod fingerprint;
pub mod geo;
pub mod reliability;
pub mod title;
pub mod verdict;

pub use consensus::consensus_status;
pub use dedup::{DedupCandidate, DedupQuery, DedupRules, MergeTarget, pick_candidate};
pub use fingerprint::{fingerprint, normalize_type};
pub use geo::haversine_km;
pub use reliability::{reliability, shift_counters};
pub use title::{derive_summary, derive_title};
pub use verdict::{EventStatus, Severity, Verdict};
