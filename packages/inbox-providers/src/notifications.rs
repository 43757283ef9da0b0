use reqwest::Client;
use serde::Serialize;

use crate::Result;
use inbox_domain::notification::NotificationMessage;

#[derive(Serialize)]
struct BulkTrigger<'a> {
	events: &'a [NotificationMessage],
}

/// Notification service client; every call is one bulk trigger.
#[derive(Clone)]
pub struct NotificationClient {
	client: Client,
	url: String,
}
impl NotificationClient {
	pub fn new(cfg: &inbox_config::ProviderConfig) -> Result<Self> {
		let client = crate::build_client(&cfg.api_key, &cfg.default_headers, cfg.timeout_ms)?;

		Ok(Self { client, url: crate::join_url(&cfg.api_base, &cfg.path) })
	}

	pub async fn trigger_bulk(&self, messages: &[NotificationMessage]) -> Result<()> {
		self.client
			.post(&self.url)
			.json(&BulkTrigger { events: messages })
			.send()
			.await?
			.error_for_status()?;

		Ok(())
	}
}
