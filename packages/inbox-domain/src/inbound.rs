//! Webhook wire schema and the validated email it converts into.
//!
//! The provider posts PascalCase JSON. Every field is optional on the wire so that a
//! malformed payload is classified by [`InboundWebhook::into_email`] instead of failing
//! deserialization with an opaque error. Only the envelope can make an email unroutable; a
//! broken attachment is carried through and dropped on its own during extraction.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundWebhook {
	#[serde(rename = "OriginalRecipient")]
	pub original_recipient: Option<String>,
	#[serde(rename = "FromFull")]
	pub from_full: Option<FromFull>,
	#[serde(rename = "Subject")]
	pub subject: Option<String>,
	#[serde(rename = "TextBody")]
	pub text_body: Option<String>,
	#[serde(rename = "HtmlBody")]
	pub html_body: Option<String>,
	#[serde(rename = "MessageID", alias = "MessageId")]
	pub message_id: Option<String>,
	#[serde(rename = "Attachments")]
	pub attachments: Option<Vec<WebhookAttachment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FromFull {
	#[serde(rename = "Email")]
	pub email: Option<String>,
	#[serde(rename = "Name")]
	pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAttachment {
	#[serde(rename = "Name")]
	pub name: Option<String>,
	#[serde(rename = "Content")]
	pub content: Option<String>,
	#[serde(rename = "ContentType")]
	pub content_type: Option<String>,
	/// Advisory only. A value that is not a non-negative integer is ignored.
	#[serde(rename = "ContentLength", default, deserialize_with = "lenient_length")]
	pub content_length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEmail {
	pub recipient: String,
	pub sender_email: String,
	pub sender_name: String,
	/// Already substituted with the placeholder when the provider sent an empty subject.
	pub subject: String,
	pub text_body: String,
	pub html_body: String,
	pub message_id: Option<String>,
	pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
	pub name: Option<String>,
	pub declared_content_type: Option<String>,
	pub declared_length: Option<u64>,
	/// Base64 transport encoding, exactly as received.
	pub content: Option<String>,
}
impl Attachment {
	/// Name used in logs and skip reports.
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or("<unnamed>")
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
	#[error("Payload is missing required field {field}.")]
	MissingField { field: &'static str },
}

impl InboundWebhook {
	pub fn original_recipient(&self) -> Option<&str> {
		self.original_recipient.as_deref().map(str::trim).filter(|value| !value.is_empty())
	}

	pub fn into_email(self, empty_subject: &str) -> Result<InboundEmail, PayloadError> {
		let recipient = self
			.original_recipient()
			.map(str::to_string)
			.ok_or(PayloadError::MissingField { field: "OriginalRecipient" })?;
		let from = self.from_full.ok_or(PayloadError::MissingField { field: "FromFull" })?;
		let sender_email = from
			.email
			.map(|email| email.trim().to_string())
			.filter(|email| !email.is_empty())
			.ok_or(PayloadError::MissingField { field: "FromFull.Email" })?;
		let sender_name = from.name.unwrap_or_default();
		let subject = match self.subject {
			Some(subject) if !subject.is_empty() => subject,
			_ => empty_subject.to_string(),
		};
		let attachments = self
			.attachments
			.unwrap_or_default()
			.into_iter()
			.map(|raw| Attachment {
				name: raw.name,
				declared_content_type: raw.content_type,
				declared_length: raw.content_length,
				content: raw.content,
			})
			.collect();

		Ok(InboundEmail {
			recipient,
			sender_email,
			sender_name,
			subject,
			text_body: self.text_body.unwrap_or_default(),
			html_body: self.html_body.unwrap_or_default(),
			message_id: self.message_id,
			attachments,
		})
	}
}

fn lenient_length<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;

	Ok(match value {
		Some(Value::Number(number)) => number.as_u64(),
		Some(Value::String(raw)) => raw.trim().parse().ok(),
		_ => None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload(value: serde_json::Value) -> InboundWebhook {
		serde_json::from_value(value).expect("Failed to parse webhook payload.")
	}

	#[test]
	fn empty_subject_gets_placeholder() {
		let email = payload(serde_json::json!({
			"OriginalRecipient": "abc123@inbox.midday.ai",
			"FromFull": { "Email": "billing@vendor.com", "Name": "Vendor" },
			"Subject": "",
		}))
		.into_email("No subject")
		.expect("Expected a valid email.");

		assert_eq!(email.subject, "No subject");
		assert!(email.attachments.is_empty());
		assert_eq!(email.text_body, "");
	}

	#[test]
	fn missing_sender_is_reported() {
		let err = payload(serde_json::json!({ "OriginalRecipient": "abc123@inbox.midday.ai" }))
			.into_email("No subject")
			.expect_err("Expected a missing field error.");

		assert_eq!(err, PayloadError::MissingField { field: "FromFull" });
	}

	#[test]
	fn attachment_without_content_keeps_the_email_routable() {
		let email = payload(serde_json::json!({
			"OriginalRecipient": "abc123@inbox.midday.ai",
			"FromFull": { "Email": "billing@vendor.com", "Name": "Vendor" },
			"Attachments": [{ "Name": "good.pdf", "Content": "b25l" }, { "Name": "bad.pdf" }],
		}))
		.into_email("No subject")
		.expect("A broken attachment must not reject the email.");

		assert_eq!(email.attachments.len(), 2);
		assert_eq!(email.attachments[1].label(), "bad.pdf");
		assert_eq!(email.attachments[1].content, None);
	}

	#[test]
	fn content_length_is_read_leniently() {
		let webhook = payload(serde_json::json!({
			"OriginalRecipient": "abc123@inbox.midday.ai",
			"Attachments": [
				{ "Name": "a.pdf", "Content": "b25l", "ContentLength": "3" },
				{ "Name": "b.pdf", "Content": "b25l", "ContentLength": -1 },
				{ "Name": "c.pdf", "Content": "b25l", "ContentLength": null },
				{ "Name": "d.pdf", "Content": "b25l" },
				{ "Name": "e.pdf", "Content": "b25l", "ContentLength": 3 },
			],
		}));
		let lengths = webhook
			.attachments
			.unwrap_or_default()
			.into_iter()
			.map(|attachment| attachment.content_length)
			.collect::<Vec<_>>();

		assert_eq!(lengths, vec![Some(3), None, None, None, Some(3)]);
	}

	#[test]
	fn blank_recipient_counts_as_absent() {
		let webhook = payload(serde_json::json!({ "OriginalRecipient": "   " }));

		assert_eq!(webhook.original_recipient(), None);
	}
}
