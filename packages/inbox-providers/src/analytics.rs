use reqwest::Client;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEvent {
	pub event: String,
	pub icon: Option<String>,
}

/// Product analytics log client.
#[derive(Clone)]
pub struct AnalyticsClient {
	client: Client,
	url: String,
	project: String,
	channel: String,
}
impl AnalyticsClient {
	pub fn new(cfg: &inbox_config::AnalyticsProviderConfig) -> Result<Self> {
		let client = crate::build_client(&cfg.api_key, &cfg.default_headers, cfg.timeout_ms)?;

		Ok(Self {
			client,
			url: crate::join_url(&cfg.api_base, &cfg.path),
			project: cfg.project.clone(),
			channel: cfg.channel.clone(),
		})
	}

	pub async fn track(&self, event: &TrackedEvent) -> Result<()> {
		let body = serde_json::json!({
			"project": self.project,
			"channel": self.channel,
			"event": event.event,
			"icon": event.icon,
			"notify": false,
		});

		self.client.post(&self.url).json(&body).send().await?.error_for_status()?;

		Ok(())
	}
}
