use serde::{Deserialize, Serialize};

/// Human review outcome recorded on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
	Unknown,
	Confirmed,
	Disproved,
}

impl Verdict {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_lowercase().as_str() {
			"unknown" => Some(Self::Unknown),
			"confirmed" => Some(Self::Confirmed),
			"disproved" => Some(Self::Disproved),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::Confirmed => "confirmed",
			Self::Disproved => "disproved",
		}
	}
}

/// Consensus status of an event, derived from the verdicts of its evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
	Pending,
	Confirmed,
	Disproved,
}

impl EventStatus {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_lowercase().as_str() {
			"pending" => Some(Self::Pending),
			"confirmed" => Some(Self::Confirmed),
			"disproved" => Some(Self::Disproved),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Confirmed => "confirmed",
			Self::Disproved => "disproved",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	High,
	Critical,
}

impl Severity {
	/// Maps a feed priority label onto a severity. Unrecognized or missing
	/// labels fall back to medium.
	pub fn from_priority(priority: Option<&str>) -> Self {
		match priority.map(|p| p.trim().to_lowercase()).as_deref() {
			Some("low") => Self::Low,
			Some("high") | Some("urgent") => Self::High,
			Some("critical") => Self::Critical,
			_ => Self::Medium,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
			Self::Critical => "critical",
		}
	}
}
