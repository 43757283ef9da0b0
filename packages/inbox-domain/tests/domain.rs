use std::net::IpAddr;

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use inbox_domain::{
	attachment::{self, ExtractError},
	filename,
	inbound::Attachment,
	notification::{self, NotificationMessage, NotificationRecipient},
	recipient::{self, RecipientError},
	source::{Rejection, SourceVerifier},
};

fn ip(raw: &str) -> IpAddr {
	raw.parse().expect("Test address must parse.")
}

fn postmark_verifier() -> SourceVerifier {
	SourceVerifier::new(vec![
		ip("3.134.147.250"),
		ip("50.31.156.6"),
		ip("50.31.156.77"),
		ip("18.217.206.57"),
	])
}

fn pdf_attachment(name: &str, bytes: &[u8]) -> Attachment {
	Attachment {
		name: Some(name.to_string()),
		declared_content_type: Some("application/octet-stream".to_string()),
		declared_length: Some(bytes.len() as u64),
		content: Some(STANDARD.encode(bytes)),
	}
}

#[test]
fn same_original_name_yields_distinct_stored_names() {
	let first = filename::compose_stored_filename("invoice.pdf", "a1B");
	let second = filename::compose_stored_filename("invoice.pdf", "zZ9");

	assert_ne!(first, second);

	for stored in [&first, &second] {
		assert!(stored.starts_with("invoice-"), "Unexpected stored name: {stored}");
		assert!(stored.ends_with(".pdf"), "Unexpected stored name: {stored}");
	}
}

#[test]
fn random_tokens_compose_into_safe_names() {
	let stored = filename::compose_stored_filename("invoice.pdf", &filename::random_token(3));

	assert_eq!(stored.len(), "invoice-".len() + 3 + ".pdf".len());
	assert_eq!(filename::strip_special_characters(&stored), stored);
}

#[test]
fn stored_name_keeps_first_base_segment_and_last_extension() {
	assert_eq!(filename::compose_stored_filename("Q3.report.final.PDF", "abc"), "Q3-abc.PDF");
}

#[test]
fn stored_name_strips_unsafe_characters() {
	assert_eq!(
		filename::compose_stored_filename("Fa ktura #12 (copy).pdf", "x1y"),
		"Faktura12copy-x1y.pdf"
	);
	assert_eq!(filename::strip_special_characters("a/b\\c?d.pdf"), "abcd.pdf");
}

#[test]
fn name_without_period_is_stored_without_extension() {
	assert_eq!(filename::compose_stored_filename("scan", "Q7k"), "scan-Q7k");
}

#[test]
fn empty_base_falls_back() {
	assert_eq!(filename::compose_stored_filename(".pdf", "abc"), "attachment-abc.pdf");
	assert_eq!(filename::compose_stored_filename("???.pdf", "abc"), "attachment-abc.pdf");
}

#[test]
fn extraction_decodes_payload_and_forces_content_type() {
	let bytes = b"%PDF-1.7 fake invoice body";
	let extracted =
		attachment::extract(&pdf_attachment("invoice.pdf", bytes), "aB3", "application/pdf")
			.expect("Attachment must decode.");

	assert_eq!(extracted.bytes, bytes.to_vec());
	assert_eq!(extracted.size(), bytes.len() as u64);
	assert_eq!(extracted.content_type, "application/pdf");
	assert_eq!(extracted.stored_name, "invoice-aB3.pdf");
	assert!(!extracted.length_mismatch());
}

#[test]
fn extraction_tolerates_wrapped_base64() {
	let bytes = vec![7_u8; 120];
	let encoded = STANDARD.encode(&bytes);
	let wrapped = format!("{}\r\n{}", &encoded[..60], &encoded[60..]);

	assert_eq!(attachment::decode_content(&wrapped).expect("Wrapped base64 must decode."), bytes);
}

#[test]
fn extraction_reports_invalid_base64() {
	let mut broken = pdf_attachment("invoice.pdf", b"body");

	broken.content = Some("not base64!!".to_string());

	let err = attachment::extract(&broken, "abc", "application/pdf")
		.expect_err("Invalid base64 must fail.");

	assert!(matches!(err, ExtractError::Decode { ref name, .. } if name == "invoice.pdf"));
}

#[test]
fn extraction_reports_missing_name_or_content() {
	let mut nameless = pdf_attachment("invoice.pdf", b"body");

	nameless.name = None;

	assert!(matches!(
		attachment::extract(&nameless, "abc", "application/pdf"),
		Err(ExtractError::MissingField { field: "Name", .. })
	));

	let mut empty = pdf_attachment("bad.pdf", b"body");

	empty.content = None;

	assert!(matches!(
		attachment::extract(&empty, "abc", "application/pdf"),
		Err(ExtractError::MissingField { ref name, field: "Content" }) if name == "bad.pdf"
	));
}

#[test]
fn declared_length_mismatch_is_detected() {
	let mut lying = pdf_attachment("invoice.pdf", b"four");

	lying.declared_length = Some(10);

	let extracted =
		attachment::extract(&lying, "abc", "application/pdf").expect("Attachment must decode.");

	assert!(extracted.length_mismatch());
}

#[test]
fn local_part_routes_exactly() {
	assert_eq!(recipient::inbox_local_part("abc123@company.midday.ai"), Ok("abc123"));
	assert_eq!(recipient::inbox_local_part("AbC123@inbox.midday.ai"), Ok("AbC123"));
	assert_eq!(
		recipient::inbox_local_part("abc123"),
		Err(RecipientError::MissingSeparator { address: "abc123".to_string() })
	);
	assert_eq!(
		recipient::inbox_local_part("@inbox.midday.ai"),
		Err(RecipientError::EmptyLocalPart { address: "@inbox.midday.ai".to_string() })
	);
}

#[test]
fn verifier_accepts_only_allow_listed_origins_with_recipient() {
	let verifier = postmark_verifier();

	assert_eq!(verifier.verify(Some(ip("50.31.156.77")), Some("abc123@inbox.midday.ai")), Ok(()));
	assert_eq!(
		verifier.verify(Some(ip("203.0.113.9")), Some("abc123@inbox.midday.ai")),
		Err(Rejection::UntrustedOrigin(ip("203.0.113.9")))
	);
	assert_eq!(
		verifier.verify(None, Some("abc123@inbox.midday.ai")),
		Err(Rejection::MissingOrigin)
	);
	assert_eq!(verifier.verify(Some(ip("3.134.147.250")), Some("")), Err(Rejection::MissingRecipient));
	assert_eq!(verifier.verify(Some(ip("3.134.147.250")), None), Err(Rejection::MissingRecipient));
}

#[test]
fn notification_message_serializes_for_bulk_trigger() {
	let record_id = Uuid::new_v4();
	let team_id = Uuid::new_v4();
	let message = NotificationMessage::inbox_new_in_app(
		NotificationRecipient {
			subscriber_id: "user-1".to_string(),
			team_id,
			email: Some("owner@company.com".to_string()),
			full_name: Some("Owner".to_string()),
			avatar_url: None,
			locale: Some("en".to_string()),
		},
		record_id,
		"invoice-aB3.pdf",
		"March invoice",
	);
	let json = serde_json::to_value(&message).expect("Message must serialize.");

	assert_eq!(json["name"], notification::INBOX_NEW_IN_APP);
	assert_eq!(json["to"]["subscriberId"], "user-1");
	assert_eq!(json["to"]["teamId"], team_id.to_string());
	assert_eq!(json["payload"]["recordId"], record_id.to_string());
	assert_eq!(json["payload"]["description"], "invoice-aB3.pdf - March invoice");
	assert_eq!(json["payload"]["type"], "inbox");
}
