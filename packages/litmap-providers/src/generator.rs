use std::{sync::LazyLock, time::Duration};

use color_eyre::{Result, eyre};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use litmap_config::LlmProviderConfig;

const JSON_ATTEMPTS: usize = 3;

static CODE_FENCE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").ok());

/// Asks a chat-completion endpoint for a JSON object.
///
/// The request is repeated when the model answers with something that does not parse; transport
/// and HTTP status errors are returned immediately.
pub async fn generate_json(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<Value> {
	let client = client(cfg)?;

	for attempt in 1..=JSON_ATTEMPTS {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
			"response_format": { "type": "json_object" },
		});
		let json = post(&client, cfg, &body).await?;

		match parse_json_content(&json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => tracing::warn!(attempt, error = %err, "Generator returned unparseable JSON."),
		}
	}

	Err(eyre::eyre!("Generator response is not valid JSON."))
}

pub async fn generate_text(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = client(cfg)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let json = post(&client, cfg, &body).await?;
	let content = message_content(&json)
		.ok_or_else(|| eyre::eyre!("Generator response is missing message content."))?
		.trim();

	if content.is_empty() {
		return Err(eyre::eyre!("Generator returned an empty message."));
	}

	Ok(content.to_string())
}

fn client(cfg: &LlmProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

async fn post(client: &Client, cfg: &LlmProviderConfig, body: &Value) -> Result<Value> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(Some(&cfg.api_key), &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn message_content(json: &Value) -> Option<&str> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
}

fn parse_json_content(json: &Value) -> Result<Value> {
	let Some(content) = message_content(json) else {
		return Err(eyre::eyre!("Generator response is missing message content."));
	};
	let parsed: Value = serde_json::from_str(strip_code_fence(content))
		.map_err(|_| eyre::eyre!("Generator content is not valid JSON."))?;

	Ok(parsed)
}

fn strip_code_fence(content: &str) -> &str {
	CODE_FENCE
		.as_ref()
		.and_then(|re| re.captures(content))
		.and_then(|caps| caps.get(1))
		.map(|body| body.as_str())
		.unwrap_or(content)
		.trim()
}
