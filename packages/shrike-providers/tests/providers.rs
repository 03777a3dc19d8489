use reqwest::header::AUTHORIZATION;
use serde_json::Map;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		shrike_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn forwards_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-request-source".to_string(), serde_json::json!("ingest"));

	let headers =
		shrike_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-request-source").expect("Missing forwarded header."), "ingest");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-count".to_string(), serde_json::json!(3));

	assert!(shrike_providers::auth_headers("secret", &defaults).is_err());
}
