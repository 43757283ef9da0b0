use std::collections::BTreeMap;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
	pub from: String,
	pub to: Vec<String>,
	pub subject: String,
	pub text: String,
	pub html: String,
	pub attachments: Vec<OutboundAttachment>,
	pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundAttachment {
	pub filename: String,
	/// Base64 content, passed through untouched.
	pub content: String,
}

/// Transactional email relay client.
#[derive(Clone)]
pub struct EmailClient {
	client: Client,
	url: String,
}
impl EmailClient {
	pub fn new(cfg: &inbox_config::ProviderConfig) -> Result<Self> {
		let client = crate::build_client(&cfg.api_key, &cfg.default_headers, cfg.timeout_ms)?;

		Ok(Self { client, url: crate::join_url(&cfg.api_base, &cfg.path) })
	}

	/// Sends the email and returns the relay's message id.
	pub async fn send(&self, email: &OutboundEmail) -> Result<String> {
		let res = self.client.post(&self.url).json(email).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_message_id(&json)
	}
}

fn parse_message_id(json: &Value) -> Result<String> {
	json.get("id").and_then(Value::as_str).map(str::to_string).ok_or_else(|| {
		Error::InvalidResponse { message: "Email relay response is missing id.".to_string() }
	})
}
