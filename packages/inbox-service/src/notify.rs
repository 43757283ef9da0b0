use tracing::warn;

use crate::{InboxService, Result};
use inbox_domain::notification::{NotificationMessage, NotificationRecipient};
use inbox_storage::models::{InboxItem, Tenant, TenantMember};

impl InboxService {
	/// Sends one in-app notification per (member, item) pair in a single bulk call.
	///
	/// Returns the number of messages submitted. Nothing is sent when the tenant has no members.
	pub async fn notify_members(&self, tenant: &Tenant, items: &[InboxItem]) -> Result<usize> {
		let members = self.collaborators.store.list_members(tenant.id).await?;
		let messages = build_messages(&members, items);

		if messages.is_empty() {
			return Ok(0);
		}

		self.collaborators.notifications.bulk_publish(&messages).await?;

		Ok(messages.len())
	}

	pub(crate) async fn notify_best_effort(
		&self,
		tenant: &Tenant,
		items: &[InboxItem],
	) -> Result<usize, String> {
		self.notify_members(tenant, items).await.map_err(|err| {
			warn!(
				error_kind = "notification",
				tenant_id = %tenant.id,
				error = %err,
				"Failed to send inbox notifications."
			);

			err.to_string()
		})
	}
}

/// Flattens members × items into messages, member-major.
pub fn build_messages(members: &[TenantMember], items: &[InboxItem]) -> Vec<NotificationMessage> {
	members
		.iter()
		.flat_map(|member| {
			items.iter().map(move |item| {
				NotificationMessage::inbox_new_in_app(
					recipient(member),
					item.id,
					&item.file_name,
					&item.subject,
				)
			})
		})
		.collect()
}

fn recipient(member: &TenantMember) -> NotificationRecipient {
	NotificationRecipient {
		subscriber_id: member.subscriber_id.clone(),
		team_id: member.team_id,
		email: member.email.clone(),
		full_name: member.full_name.clone(),
		avatar_url: member.avatar_url.clone(),
		locale: member.locale.clone(),
	}
}
