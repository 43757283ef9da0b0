mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AnalyticsProviderConfig, Config, Inbox, ObjectStorage, Postgres, ProviderConfig, Providers,
	Service, Storage, Webhook,
};

use std::{fs, net::IpAddr, path::Path};

pub const MAX_FILENAME_TOKEN_LEN: usize = 16;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.handler_timeout_secs == 0 {
		return Err(Error::Validation {
			message: "service.handler_timeout_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.service.max_body_bytes == 0 {
		return Err(Error::Validation {
			message: "service.max_body_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.webhook.allowed_ips.is_empty() {
		return Err(Error::Validation {
			message: "webhook.allowed_ips must be non-empty.".to_string(),
		});
	}

	allowed_ips(&cfg.webhook)?;

	if !is_header_name(&cfg.webhook.client_ip_header) {
		return Err(Error::Validation {
			message: "webhook.client_ip_header must be a valid lowercase header name.".to_string(),
		});
	}
	if !(1..=MAX_FILENAME_TOKEN_LEN).contains(&cfg.inbox.filename_token_len) {
		return Err(Error::Validation {
			message: format!(
				"inbox.filename_token_len must be in the range 1-{MAX_FILENAME_TOKEN_LEN}."
			),
		});
	}

	for (label, value) in [
		("storage.objects.bucket", &cfg.storage.objects.bucket),
		("inbox.content_type", &cfg.inbox.content_type),
		("inbox.empty_subject", &cfg.inbox.empty_subject),
		("inbox.forward_from_address", &cfg.inbox.forward_from_address),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !cfg.inbox.forward_from_address.contains('@') {
		return Err(Error::Validation {
			message: "inbox.forward_from_address must be an email address.".to_string(),
		});
	}

	for (label, key) in [
		("storage.objects", &cfg.storage.objects.api_key),
		("providers.jobs", &cfg.providers.jobs.api_key),
		("providers.notifications", &cfg.providers.notifications.api_key),
		("providers.email", &cfg.providers.email.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} api_key must be non-empty.") });
		}
	}

	if let Some(analytics) = cfg.providers.analytics.as_ref() {
		if analytics.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.analytics api_key must be non-empty.".to_string(),
			});
		}
		if analytics.project.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.analytics.project must be non-empty.".to_string(),
			});
		}
	}

	Ok(())
}

/// Parses `webhook.allowed_ips` into addresses.
pub fn allowed_ips(webhook: &Webhook) -> Result<Vec<IpAddr>> {
	webhook
		.allowed_ips
		.iter()
		.map(|raw| {
			raw.trim().parse::<IpAddr>().map_err(|err| Error::InvalidIp {
				field: "webhook.allowed_ips",
				value: raw.clone(),
				source: err,
			})
		})
		.collect()
}

fn is_header_name(name: &str) -> bool {
	!name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

fn normalize(cfg: &mut Config) {
	cfg.webhook.client_ip_header = cfg.webhook.client_ip_header.trim().to_ascii_lowercase();

	for value in &mut cfg.webhook.allowed_ips {
		*value = value.trim().to_string();
	}

	if cfg
		.providers
		.analytics
		.as_ref()
		.map(|analytics| analytics.api_base.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.analytics = None;
	}
}
