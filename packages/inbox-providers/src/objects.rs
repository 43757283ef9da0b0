use reqwest::{
	Client,
	header::{CONTENT_TYPE, HeaderValue},
};
use serde_json::Value;

use crate::{Error, Result};

/// Storage API client (`/object/{bucket}/{path}`), one per process.
#[derive(Clone)]
pub struct ObjectStorageClient {
	client: Client,
	api_base: String,
}
impl ObjectStorageClient {
	pub fn new(cfg: &inbox_config::ObjectStorage) -> Result<Self> {
		let client = crate::build_client(&cfg.api_key, &cfg.default_headers, cfg.timeout_ms)?;

		Ok(Self { client, api_base: cfg.api_base.clone() })
	}

	/// Uploads `bytes` without overwriting an existing object and returns the stored path,
	/// relative to the bucket.
	pub async fn upload(
		&self,
		bucket: &str,
		path: &str,
		bytes: &[u8],
		content_type: &str,
	) -> Result<String> {
		let res = self
			.client
			.post(self.object_url(bucket, path))
			.header(CONTENT_TYPE, HeaderValue::from_str(content_type)?)
			.header("x-upsert", "false")
			.body(bytes.to_vec())
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_upload_key(&json, bucket)
	}

	pub async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
		let res = self.client.get(self.object_url(bucket, path)).send().await?;
		let bytes = res.error_for_status()?.bytes().await?;

		Ok(bytes.to_vec())
	}

	fn object_url(&self, bucket: &str, path: &str) -> String {
		crate::join_url(&self.api_base, &format!("object/{bucket}/{}", path.trim_start_matches('/')))
	}
}

fn parse_upload_key(json: &Value, bucket: &str) -> Result<String> {
	let key = json
		.get("Key")
		.or_else(|| json.get("path"))
		.and_then(Value::as_str)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Storage upload response is missing Key.".to_string(),
		})?;
	let path = key.strip_prefix(bucket).and_then(|rest| rest.strip_prefix('/')).unwrap_or(key);

	if path.is_empty() {
		return Err(Error::InvalidResponse {
			message: "Storage upload response has an empty Key.".to_string(),
		});
	}

	Ok(path.to_string())
}
