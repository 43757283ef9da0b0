use std::net::{IpAddr, SocketAddr};

use axum::{
	Json, Router,
	body::{self, Body},
	extract::{ConnectInfo, DefaultBodyLimit, Request, State},
	http::{HeaderMap, StatusCode},
	routing::{get, post},
};
use serde_json::Value;

use crate::state::AppState;
use inbox_domain::source;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/webhook/inbox", post(inbox_webhook))
		.layer(DefaultBodyLimit::disable())
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Always acknowledges with `{"success":true}` so the provider never retries on our errors.
async fn inbox_webhook(State(state): State<AppState>, req: Request) -> Json<Value> {
	let (parts, body) = req.into_parts();
	let origin = client_ip(
		&parts.headers,
		&state.service.cfg.webhook.client_ip_header,
		parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|info| info.0),
	);

	match read_body(body, state.service.cfg.service.max_body_bytes).await {
		Ok(bytes) => {
			state.service.handle_webhook(origin, &bytes).await;
		},
		Err(err) => {
			tracing::warn!(error_kind = "body", error = %err, "Failed to read webhook body.");
		},
	}

	Json(serde_json::json!({ "success": true }))
}

async fn read_body(body: Body, limit: usize) -> Result<body::Bytes, axum::Error> {
	body::to_bytes(body, limit).await
}

/// First entry of the proxy header, falling back to the socket peer.
pub fn client_ip(headers: &HeaderMap, header: &str, peer: Option<SocketAddr>) -> Option<IpAddr> {
	headers
		.get(header)
		.and_then(|value| value.to_str().ok())
		.and_then(source::parse_forwarded_ip)
		.or_else(|| peer.map(|addr| addr.ip()))
}
