use time::OffsetDateTime;

/// Bumped whenever the bucketing scheme changes so old hashes never collide
/// with new ones.
const FINGERPRINT_VERSION: u32 = 1;

const TIME_BUCKET_MILLIS: i128 = 3_600_000;
const COORD_BUCKET_DEGREES: f64 = 0.1;

/// Lowercased, trimmed event type. Empty input maps to the generic bucket so
/// unclassified reports still fingerprint deterministically.
pub fn normalize_type(raw: &str) -> String {
	let normalized = raw.trim().to_lowercase();

	if normalized.is_empty() { "generic_report".to_string() } else { normalized }
}

/// Coarse identity hash over type, hour bucket, and 0.1-degree coordinate
/// buckets. Diagnostic signal only; merge decisions go through the vector
/// candidate path.
pub fn fingerprint(
	event_type: &str,
	occurred_at: OffsetDateTime,
	latitude: Option<f64>,
	longitude: Option<f64>,
) -> String {
	let ty = normalize_type(event_type);
	let millis = occurred_at.unix_timestamp_nanos() / 1_000_000;
	let time_bucket = millis.div_euclid(TIME_BUCKET_MILLIS);
	let (lat_bucket, lon_bucket) = match (latitude, longitude) {
		(Some(lat), Some(lon)) => (coord_bucket(lat), coord_bucket(lon)),
		_ => ("null".to_string(), "null".to_string()),
	};
	let material = format!("{FINGERPRINT_VERSION}|{ty}|{time_bucket}|{lat_bucket}|{lon_bucket}");

	blake3::hash(material.as_bytes()).to_hex().to_string()
}

fn coord_bucket(degrees: f64) -> String {
	((degrees / COORD_BUCKET_DEGREES).floor() as i64).to_string()
}
