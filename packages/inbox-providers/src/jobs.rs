use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

/// Sends events to the background job platform.
#[derive(Clone)]
pub struct JobClient {
	client: Client,
	url: String,
}
impl JobClient {
	pub fn new(cfg: &inbox_config::ProviderConfig) -> Result<Self> {
		let client = crate::build_client(&cfg.api_key, &cfg.default_headers, cfg.timeout_ms)?;

		Ok(Self { client, url: crate::join_url(&cfg.api_base, &cfg.path) })
	}

	pub async fn send_event(&self, name: &str, payload: &Value) -> Result<()> {
		let body = event_body(Uuid::new_v4(), name, payload);

		self.client.post(&self.url).json(&body).send().await?.error_for_status()?;

		Ok(())
	}
}

fn event_body(id: Uuid, name: &str, payload: &Value) -> Value {
	serde_json::json!({
		"event": {
			"id": id,
			"name": name,
			"payload": payload,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wraps_payload_in_event_envelope() {
		let id = Uuid::nil();
		let body = event_body(id, "process-document", &serde_json::json!({ "inboxId": "x" }));

		assert_eq!(body["event"]["name"], "process-document");
		assert_eq!(body["event"]["payload"]["inboxId"], "x");
		assert_eq!(body["event"]["id"], id.to_string());
	}
}
