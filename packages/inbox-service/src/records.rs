use futures::future;
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{InboxService, Result};
use inbox_domain::PROCESS_DOCUMENT_EVENT;
use inbox_storage::models::{InboxItem, NewInboxItem};

/// One job publication that failed; the others were unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
	pub item_id: Uuid,
	pub message: String,
}

impl InboxService {
	/// Persists every draft in one batch. On failure the whole batch is lost for this delivery.
	pub async fn persist_items(&self, drafts: &[NewInboxItem]) -> Result<Vec<InboxItem>> {
		let result = self.collaborators.store.insert_items(drafts).await;

		if let Err(err) = &result {
			error!(
				error_kind = "persistence",
				error = %err,
				items = drafts.len(),
				"Failed to persist inbox items."
			);
		}

		result
	}

	/// Publishes one process-document job per item, concurrently, each failure caught on its own.
	pub async fn publish_jobs(&self, items: &[InboxItem]) -> (usize, Vec<JobFailure>) {
		let tasks = items.iter().map(|item| async move {
			let payload = process_document_payload(item.id);

			(item.id, self.collaborators.jobs.publish(PROCESS_DOCUMENT_EVENT, &payload).await)
		});
		let mut published = 0;
		let mut failures = Vec::new();

		for (item_id, result) in future::join_all(tasks).await {
			match result {
				Ok(()) => published += 1,
				Err(err) => {
					warn!(
						error_kind = "publish",
						inbox_item_id = %item_id,
						error = %err,
						"Failed to publish process-document job."
					);

					failures.push(JobFailure { item_id, message: err.to_string() });
				},
			}
		}

		(published, failures)
	}
}

pub fn process_document_payload(inbox_id: Uuid) -> Value {
	serde_json::json!({ "inboxId": inbox_id })
}
