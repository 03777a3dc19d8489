use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds a batch of texts against an OpenAI-compatible endpoint, preserving
/// input order even when the provider reorders the response.
pub async fn embed(
	cfg: &shrike_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: serde_json::Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json, texts.len())
}

pub async fn embed_one(
	cfg: &shrike_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let mut vectors = embed(cfg, std::slice::from_ref(&text.to_string())).await?;

	vectors.pop().ok_or_else(|| eyre::eyre!("Embedding response contained no vectors."))
}

fn parse_embedding_response(json: serde_json::Value, expected: usize) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json)
		.map_err(|err| eyre::eyre!("Malformed embedding response: {err}"))?;

	if response.data.len() != expected {
		return Err(eyre::eyre!(
			"Embedding response has {} vectors, expected {expected}.",
			response.data.len()
		));
	}

	let mut indexed: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(fallback, item)| (item.index.unwrap_or(fallback), item.embedding))
		.collect();

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
