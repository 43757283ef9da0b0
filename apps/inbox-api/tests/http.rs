use std::net::SocketAddr;

use axum::{
	Router,
	body::{self, Body},
	extract::ConnectInfo,
	http::{HeaderMap, Request, StatusCode},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use tower::util::ServiceExt;

use inbox_api::{routes, state::AppState};
use inbox_testkit::{
	config::{TRUSTED_ORIGIN, UNTRUSTED_ORIGIN, test_config},
	fakes::Fakes,
};

fn app(fakes: &Fakes) -> Router {
	let state =
		AppState::from_parts(test_config(), fakes.collaborators()).expect("Failed to build state.");

	routes::router(state)
}

fn webhook_body() -> String {
	serde_json::json!({
		"OriginalRecipient": "abc123@inbox.midday.ai",
		"FromFull": { "Email": "billing@vendor.com", "Name": "Vendor" },
		"Subject": "Invoice",
		"TextBody": "Attached.",
		"HtmlBody": "<p>Attached.</p>",
		"Attachments": [{
			"Name": "invoice.pdf",
			"Content": STANDARD.encode(b"%PDF-1.7"),
			"ContentType": "application/pdf",
			"ContentLength": 8,
		}],
	})
	.to_string()
}

fn webhook_request(forwarded_for: Option<&str>, body: String) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri("/webhook/inbox")
		.header("content-type", "application/json");

	if let Some(forwarded_for) = forwarded_for {
		builder = builder.header("x-forwarded-for", forwarded_for);
	}

	builder.body(Body::from(body)).expect("Failed to build request.")
}

async fn acknowledged(app: Router, req: Request<Body>) {
	let response = app.oneshot(req).await.expect("Failed to call webhook.");

	assert_eq!(response.status(), StatusCode::OK);

	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json: Value = serde_json::from_slice(&bytes).expect("Response must be JSON.");

	assert_eq!(json, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn health_ok() {
	let fakes = Fakes::default();
	let response = app(&fakes)
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn trusted_delivery_is_processed_and_acknowledged() {
	let fakes = Fakes::default();

	fakes.store.add_tenant("abc123", None);

	acknowledged(
		app(&fakes),
		webhook_request(Some(&format!("{TRUSTED_ORIGIN}, 10.0.0.2")), webhook_body()),
	)
	.await;

	let items = fakes.store.items();

	assert_eq!(items.len(), 1);
	assert!(items[0].file_name.starts_with("invoice-"));
	assert_eq!(fakes.jobs.published().len(), 1);
}

#[tokio::test]
async fn untrusted_delivery_is_acknowledged_and_dropped() {
	let fakes = Fakes::default();

	fakes.store.add_tenant("abc123", None);

	acknowledged(app(&fakes), webhook_request(Some(UNTRUSTED_ORIGIN), webhook_body())).await;

	assert!(fakes.store.items().is_empty());
	assert_eq!(fakes.store.calls(), 0);
}

#[tokio::test]
async fn unknown_tenant_is_acknowledged() {
	let fakes = Fakes::default();

	acknowledged(app(&fakes), webhook_request(Some(TRUSTED_ORIGIN), webhook_body())).await;

	assert!(fakes.store.items().is_empty());
	assert!(fakes.notifications.batches().is_empty());
}

#[tokio::test]
async fn malformed_body_is_acknowledged() {
	let fakes = Fakes::default();

	acknowledged(app(&fakes), webhook_request(Some(TRUSTED_ORIGIN), "{not json".to_string()))
		.await;

	assert_eq!(fakes.store.calls(), 0);
}

#[tokio::test]
async fn peer_address_is_used_without_proxy_header() {
	let fakes = Fakes::default();

	fakes.store.add_tenant("abc123", None);

	let mut req = webhook_request(None, webhook_body());
	let peer: SocketAddr = format!("{TRUSTED_ORIGIN}:44321").parse().expect("valid addr");

	req.extensions_mut().insert(ConnectInfo(peer));

	acknowledged(app(&fakes), req).await;

	assert_eq!(fakes.store.items().len(), 1);
}

#[test]
fn proxy_header_takes_precedence_over_peer() {
	let mut headers = HeaderMap::new();
	let peer: SocketAddr = "10.0.0.9:5000".parse().expect("valid addr");

	headers.insert("x-forwarded-for", "50.31.156.6, 10.0.0.1".parse().expect("valid header"));

	assert_eq!(
		routes::client_ip(&headers, "x-forwarded-for", Some(peer)),
		Some("50.31.156.6".parse().expect("valid ip"))
	);
	assert_eq!(
		routes::client_ip(&HeaderMap::new(), "x-forwarded-for", Some(peer)),
		Some(peer.ip())
	);
	assert_eq!(routes::client_ip(&HeaderMap::new(), "x-forwarded-for", None), None);
}
