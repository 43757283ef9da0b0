use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tenant {
	pub id: Uuid,
	/// Local-part of the tenant's inbox address; the routing key for inbound mail.
	pub inbox_id: String,
	/// Company address that receives a copy of every inbound email.
	pub inbox_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TenantMember {
	pub team_id: Uuid,
	pub user_id: Uuid,
	pub subscriber_id: String,
	pub full_name: Option<String>,
	pub email: Option<String>,
	pub avatar_url: Option<String>,
	pub locale: Option<String>,
}

/// An inbox row before insertion. Only built after its attachment was written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInboxItem {
	pub id: Uuid,
	pub team_id: Uuid,
	pub sender_email: String,
	pub sender_name: String,
	pub subject: String,
	pub file_path: Vec<String>,
	pub file_name: String,
	pub content_type: String,
	pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InboxItem {
	pub id: Uuid,
	pub team_id: Uuid,
	pub sender_email: String,
	pub sender_name: String,
	pub subject: String,
	pub file_path: Vec<String>,
	pub file_name: String,
	pub content_type: String,
	pub size: i64,
	pub forwarded_to: Option<String>,
	pub created_at: OffsetDateTime,
}
