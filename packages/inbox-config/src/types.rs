use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub webhook: Webhook,
	#[serde(default)]
	pub inbox: Inbox,
	pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Hard wall-clock budget for one webhook call. Work still running when it elapses is
	/// dropped without cleanup.
	#[serde(default = "default_handler_timeout_secs")]
	pub handler_timeout_secs: u64,
	#[serde(default = "default_max_body_bytes")]
	pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub objects: ObjectStorage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStorage {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_bucket")]
	pub bucket: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Webhook {
	/// Egress addresses of the email provider. Requests from anywhere else are dropped.
	pub allowed_ips: Vec<String>,
	/// Header carrying the caller address when running behind a proxy. The first
	/// comma-separated entry wins.
	pub client_ip_header: String,
}
impl Default for Webhook {
	fn default() -> Self {
		Self {
			// https://postmarkapp.com/support/article/800-ips-for-firewalls#webhooks
			allowed_ips: vec![
				"3.134.147.250".to_string(),
				"50.31.156.6".to_string(),
				"50.31.156.77".to_string(),
				"18.217.206.57".to_string(),
			],
			client_ip_header: "x-forwarded-for".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Inbox {
	/// Every stored attachment gets this content type; the declared one is not trusted.
	pub content_type: String,
	pub empty_subject: String,
	pub filename_token_len: usize,
	pub forward_from_address: String,
}
impl Default for Inbox {
	fn default() -> Self {
		Self {
			content_type: "application/pdf".to_string(),
			empty_subject: "No subject".to_string(),
			filename_token_len: 3,
			forward_from_address: "inbox@midday.ai".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub jobs: ProviderConfig,
	pub notifications: ProviderConfig,
	pub email: ProviderConfig,
	pub analytics: Option<AnalyticsProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub project: String,
	#[serde(default = "default_analytics_channel")]
	pub channel: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_handler_timeout_secs() -> u64 {
	300
}

fn default_max_body_bytes() -> usize {
	50 * 1_024 * 1_024
}

fn default_bucket() -> String {
	"vault".to_string()
}

fn default_analytics_channel() -> String {
	"inbox".to_string()
}
