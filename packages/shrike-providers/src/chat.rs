use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

const MAX_ATTEMPTS: usize = 3;

/// Calls an OpenAI-compatible chat endpoint and insists on a JSON object
/// reply, retrying when the model returns prose instead.
pub async fn complete_json(
	cfg: &shrike_config::LlmProviderConfig,
	messages: &[Value],
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for _ in 0..MAX_ATTEMPTS {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		if let Ok(parsed) = parse_chat_json(json) {
			return Ok(parsed);
		}
	}

	Err(eyre::eyre!("Chat response is not valid JSON."))
}

fn parse_chat_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(content.trim())
			.map_err(|_| eyre::eyre!("Chat content is not valid JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return Ok(json);
	}

	Err(eyre::eyre!("Chat response is missing JSON content."))
}
