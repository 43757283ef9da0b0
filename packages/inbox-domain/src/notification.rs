use serde::Serialize;
use uuid::Uuid;

/// Notification workflow fired for every new inbox item, delivered in-app.
pub const INBOX_NEW_IN_APP: &str = "inbox_new_in_app";
/// Payload type tag the dashboard uses to route the notification.
pub const INBOX_NOTIFICATION_TYPE: &str = "inbox";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
	pub name: String,
	pub to: NotificationRecipient,
	pub payload: NotificationPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecipient {
	pub subscriber_id: String,
	pub team_id: Uuid,
	pub email: Option<String>,
	pub full_name: Option<String>,
	pub avatar_url: Option<String>,
	pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
	pub record_id: Uuid,
	pub description: String,
	pub r#type: String,
}

pub fn describe(file_name: &str, subject: &str) -> String {
	format!("{file_name} - {subject}")
}

impl NotificationMessage {
	pub fn inbox_new_in_app(
		to: NotificationRecipient,
		record_id: Uuid,
		file_name: &str,
		subject: &str,
	) -> Self {
		Self {
			name: INBOX_NEW_IN_APP.to_string(),
			to,
			payload: NotificationPayload {
				record_id,
				description: describe(file_name, subject),
				r#type: INBOX_NOTIFICATION_TYPE.to_string(),
			},
		}
	}
}
