use futures::future;
use tracing::warn;

use crate::{InboxService, Result};
use inbox_domain::{
	attachment::{self, ExtractedAttachment},
	filename,
	inbound::{Attachment, InboundEmail},
};
use inbox_storage::models::{NewInboxItem, Tenant};

/// An attachment that produced no inbox item, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAttachment {
	pub name: String,
	pub reason: String,
}

impl InboxService {
	/// Decodes and uploads every attachment concurrently.
	///
	/// Returns drafts in attachment order for the uploads that succeeded. A failed attachment is
	/// logged and skipped; it never affects its siblings.
	pub async fn store_attachments(
		&self,
		tenant: &Tenant,
		email: &InboundEmail,
	) -> (Vec<NewInboxItem>, Vec<SkippedAttachment>) {
		let tasks = email.attachments.iter().map(|attachment| async move {
			(attachment, self.store_attachment(tenant, email, attachment).await)
		});
		let mut drafts = Vec::with_capacity(email.attachments.len());
		let mut skipped = Vec::new();

		for (attachment, result) in future::join_all(tasks).await {
			match result {
				Ok(draft) => drafts.push(draft),
				Err(reason) => {
					warn!(
						error_kind = "attachment",
						tenant_id = %tenant.id,
						attachment = attachment.label(),
						error = %reason,
						"Attachment skipped."
					);

					skipped.push(SkippedAttachment { name: attachment.label().to_string(), reason });
				},
			}
		}

		(drafts, skipped)
	}

	async fn store_attachment(
		&self,
		tenant: &Tenant,
		email: &InboundEmail,
		attachment: &Attachment,
	) -> Result<NewInboxItem, String> {
		let token = filename::random_token(self.cfg.inbox.filename_token_len);
		let extracted = attachment::extract(attachment, &token, &self.cfg.inbox.content_type)
			.map_err(|err| err.to_string())?;

		if extracted.length_mismatch() {
			warn!(
				tenant_id = %tenant.id,
				attachment = attachment.label(),
				declared = ?extracted.declared_length,
				decoded = extracted.size(),
				"Decoded attachment length differs from the declared length."
			);
		}

		let stored_path = self.upload(tenant, &extracted).await.map_err(|err| err.to_string())?;

		Ok(NewInboxItem {
			id: uuid::Uuid::new_v4(),
			team_id: tenant.id,
			sender_email: email.sender_email.clone(),
			sender_name: email.sender_name.clone(),
			subject: email.subject.clone(),
			file_path: split_path(&stored_path),
			file_name: extracted.stored_name,
			content_type: extracted.content_type,
			size: i64::try_from(extracted.bytes.len()).unwrap_or(i64::MAX),
		})
	}

	async fn upload(&self, tenant: &Tenant, extracted: &ExtractedAttachment) -> Result<String> {
		let path = object_path(tenant, &extracted.stored_name);

		self.collaborators
			.objects
			.upload(&self.cfg.storage.objects.bucket, &path, &extracted.bytes, &extracted.content_type)
			.await
	}
}

/// `{tenant_id}/inbox/{stored_name}`
pub fn object_path(tenant: &Tenant, stored_name: &str) -> String {
	format!("{}/inbox/{stored_name}", tenant.id)
}

/// Splits a storage path into its segments, dropping empty ones.
pub fn split_path(path: &str) -> Vec<String> {
	path.split('/').filter(|segment| !segment.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_path_becomes_segments() {
		assert_eq!(
			split_path("9b2c/inbox/invoice-x1y.pdf"),
			vec!["9b2c".to_string(), "inbox".to_string(), "invoice-x1y.pdf".to_string()]
		);
		assert_eq!(split_path("/a//b/"), vec!["a".to_string(), "b".to_string()]);
	}
}
