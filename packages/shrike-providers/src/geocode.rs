use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::chat;

const USER_AGENT: &str = concat!("shrike/", env!("CARGO_PKG_VERSION"));

const QUERY_PROMPT: &str = "Extract the most specific real-world place the report refers to. \
	Reply with a JSON object {\"query\": \"<place name for a geocoder>\"}; use {\"query\": null} \
	when the text names no concrete place.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
	pub latitude: f64,
	pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
	lat: String,
	lon: String,
	boundingbox: [String; 4],
}

/// Resolves the report text to coordinates: an LLM distills a geocoder query,
/// Nominatim resolves it, and implausibly wide matches (whole countries,
/// oceans) are discarded.
pub async fn locate(cfg: &shrike_config::GeocoderConfig, text: &str) -> Result<Option<GeoPoint>> {
	let Some(query) = extract_query(cfg, text).await? else {
		return Ok(None);
	};

	lookup(cfg, &query).await
}

async fn extract_query(cfg: &shrike_config::GeocoderConfig, text: &str) -> Result<Option<String>> {
	let messages = [
		serde_json::json!({ "role": "system", "content": QUERY_PROMPT }),
		serde_json::json!({ "role": "user", "content": text }),
	];
	let reply = chat::complete_json(&cfg.llm, &messages).await?;
	let query = reply
		.get("query")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|q| !q.is_empty())
		.map(str::to_string);

	Ok(query)
}

async fn lookup(cfg: &shrike_config::GeocoderConfig, query: &str) -> Result<Option<GeoPoint>> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.user_agent(USER_AGENT)
		.build()?;
	let url = format!("{}/search", cfg.nominatim_url.trim_end_matches('/'));
	let hits: Vec<NominatimHit> = client
		.get(url)
		.query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?;
	let Some(hit) = hits.into_iter().next() else {
		return Ok(None);
	};

	Ok(accept_hit(&hit, cfg.max_bbox_degrees)?)
}

fn accept_hit(hit: &NominatimHit, max_bbox_degrees: f64) -> Result<Option<GeoPoint>> {
	let latitude: f64 =
		hit.lat.parse().map_err(|_| eyre::eyre!("Geocoder latitude is not numeric."))?;
	let longitude: f64 =
		hit.lon.parse().map_err(|_| eyre::eyre!("Geocoder longitude is not numeric."))?;

	if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
		return Err(eyre::eyre!("Geocoder returned out-of-range coordinates."));
	}

	// boundingbox is [south, north, west, east].
	let bbox: Vec<f64> = hit
		.boundingbox
		.iter()
		.map(|edge| edge.parse())
		.collect::<Result<_, _>>()
		.map_err(|_| eyre::eyre!("Geocoder bounding box is not numeric."))?;
	let too_wide =
		(bbox[1] - bbox[0]).abs() > max_bbox_degrees || (bbox[3] - bbox[2]).abs() > max_bbox_degrees;
	if too_wide {
		return Ok(None);
	}

	Ok(Some(GeoPoint { latitude, longitude }))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(lat: &str, lon: &str, bbox: [&str; 4]) -> NominatimHit {
		NominatimHit {
			lat: lat.to_string(),
			lon: lon.to_string(),
			boundingbox: bbox.map(str::to_string),
		}
	}

	#[test]
	fn accepts_a_city_sized_match() {
		let point = accept_hit(
			&hit("50.4501", "30.5234", ["50.21", "50.59", "30.24", "30.83"]),
			2.0,
		)
		.expect("parse failed")
		.expect("hit rejected");

		assert!((point.latitude - 50.4501).abs() < 1e-6);
	}

	#[test]
	fn rejects_a_country_sized_match() {
		let point = accept_hit(
			&hit("48.3794", "31.1656", ["44.18", "52.38", "22.13", "40.23"]),
			2.0,
		)
		.expect("parse failed");

		assert_eq!(point, None);
	}

	#[test]
	fn rejects_out_of_range_coordinates() {
		assert!(accept_hit(&hit("95.0", "30.0", ["0", "1", "0", "1"]), 2.0).is_err());
	}
}
