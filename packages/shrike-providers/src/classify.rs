use color_eyre::{Result, eyre};
use serde::Deserialize;
use serde_json::Value;

use crate::chat;

const CLASSIFY_PROMPT: &str = "Classify the intelligence report. Reply with a JSON object \
	{\"category\": \"<short category slug>\", \"tags\": [\"<keyword>\", ...], \
	\"confidence\": <0.0-1.0>}. Use null for fields you cannot determine.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Classification {
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	pub confidence: Option<f64>,
}

/// Asks the classifier model for a category, tags, and a confidence score.
pub async fn classify(cfg: &shrike_config::LlmProviderConfig, text: &str) -> Result<Classification> {
	let messages = [
		serde_json::json!({ "role": "system", "content": CLASSIFY_PROMPT }),
		serde_json::json!({ "role": "user", "content": text }),
	];
	let reply = chat::complete_json(cfg, &messages).await?;

	parse_classification(reply)
}

fn parse_classification(reply: Value) -> Result<Classification> {
	let mut classification: Classification = serde_json::from_value(reply)
		.map_err(|err| eyre::eyre!("Malformed classification reply: {err}"))?;

	classification.category =
		classification.category.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());
	classification.tags.retain(|tag| !tag.trim().is_empty());
	classification.confidence = classification.confidence.map(|c| c.clamp(0.0, 1.0));

	Ok(classification)
}
