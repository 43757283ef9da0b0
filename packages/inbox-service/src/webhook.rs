//! Top-level webhook orchestration.
//!
//! Nothing in here fails outward: every outcome, including collaborator failures, is folded
//! into a [`WebhookOutcome`] so that the HTTP layer can always acknowledge the delivery.

use std::{net::IpAddr, time::Duration};

use tokio::time;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use crate::{
	ForwardOutcome, InboxService, attachments::SkippedAttachment, records::JobFailure,
};
use inbox_domain::{inbound::InboundWebhook, recipient, source::Rejection};
use inbox_providers::analytics::TrackedEvent;
use inbox_storage::models::InboxItem;

pub const INBOUND_EVENT: &str = "Inbox Inbound";
pub const INBOUND_EVENT_ICON: &str = "✉️";

#[derive(Debug)]
pub enum WebhookOutcome {
	/// The call did not come from the provider or named no recipient. Nothing was touched.
	Rejected(Rejection),
	/// The email cannot be routed to a tenant. Nothing was created.
	Unroutable(Unroutable),
	/// The handler budget elapsed. Work already done is left in place.
	TimedOut,
	Processed(Box<ProcessReport>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unroutable {
	MalformedPayload { message: String },
	MalformedRecipient { address: String },
	UnknownTenant { inbox_id: String },
	LookupFailed { message: String },
}

#[derive(Debug)]
pub struct ProcessReport {
	pub request_id: Uuid,
	pub tenant_id: Uuid,
	/// Persisted rows, in attachment order.
	pub items: Vec<InboxItem>,
	pub skipped_attachments: Vec<SkippedAttachment>,
	/// Set when the batch insert failed; every later phase was skipped.
	pub persistence_error: Option<String>,
	pub jobs_published: usize,
	pub job_failures: Vec<JobFailure>,
	pub notifications_sent: usize,
	pub notification_error: Option<String>,
	pub forwarding: ForwardOutcome,
	pub forward_marked: bool,
}

impl InboxService {
	/// Runs the whole inbound pipeline for one webhook delivery under the handler budget.
	pub async fn handle_webhook(&self, origin: Option<IpAddr>, body: &[u8]) -> WebhookOutcome {
		let request_id = Uuid::new_v4();
		let span = tracing::info_span!("inbox_webhook", request_id = %request_id);
		let budget = Duration::from_secs(self.cfg.service.handler_timeout_secs);
		let work = self.process(request_id, origin, body).instrument(span.clone());

		match time::timeout(budget, work).await {
			Ok(outcome) => outcome,
			Err(_) => {
				error!(
					parent: &span,
					error_kind = "timeout",
					budget_secs = budget.as_secs(),
					"Webhook handler exceeded its budget."
				);

				WebhookOutcome::TimedOut
			},
		}
	}

	async fn process(&self, request_id: Uuid, origin: Option<IpAddr>, body: &[u8]) -> WebhookOutcome {
		self.track_inbound().await;

		if let Err(rejection) = self.verifier.verify_origin(origin) {
			debug!(error_kind = "untrusted_origin", ?rejection, "Webhook call dropped.");

			return WebhookOutcome::Rejected(rejection);
		}

		let webhook = match serde_json::from_slice::<InboundWebhook>(body) {
			Ok(webhook) => webhook,
			Err(err) =>
				return unroutable(Unroutable::MalformedPayload { message: err.to_string() }),
		};

		if let Err(rejection) = self.verifier.verify(origin, webhook.original_recipient()) {
			debug!(error_kind = "missing_recipient", ?rejection, "Webhook call dropped.");

			return WebhookOutcome::Rejected(rejection);
		}

		let email = match webhook.into_email(&self.cfg.inbox.empty_subject) {
			Ok(email) => email,
			Err(err) =>
				return unroutable(Unroutable::MalformedPayload { message: err.to_string() }),
		};
		let inbox_id = match recipient::inbox_local_part(&email.recipient) {
			Ok(inbox_id) => inbox_id,
			Err(_) =>
				return unroutable(Unroutable::MalformedRecipient {
					address: email.recipient.clone(),
				}),
		};
		let tenant = match self.collaborators.store.find_tenant(inbox_id).await {
			Ok(Some(tenant)) => tenant,
			Ok(None) =>
				return unroutable(Unroutable::UnknownTenant { inbox_id: inbox_id.to_string() }),
			Err(err) => {
				error!(error_kind = "unroutable", error = %err, inbox_id, "Tenant lookup failed.");

				return WebhookOutcome::Unroutable(Unroutable::LookupFailed {
					message: err.to_string(),
				});
			},
		};
		let (forwarding, (drafts, skipped_attachments)) =
			tokio::join!(self.forward_email(&tenant, &email), self.store_attachments(&tenant, &email));
		let mut report = ProcessReport {
			request_id,
			tenant_id: tenant.id,
			items: Vec::new(),
			skipped_attachments,
			persistence_error: None,
			jobs_published: 0,
			job_failures: Vec::new(),
			notifications_sent: 0,
			notification_error: None,
			forwarding,
			forward_marked: false,
		};

		if drafts.is_empty() {
			info!(tenant_id = %tenant.id, "Inbound email carried no storable attachments.");

			return WebhookOutcome::Processed(Box::new(report));
		}

		let mut items = match self.persist_items(&drafts).await {
			Ok(items) => items,
			Err(err) => {
				report.persistence_error = Some(err.to_string());

				return WebhookOutcome::Processed(Box::new(report));
			},
		};
		let ((jobs_published, job_failures), notified, forward_marked) = tokio::join!(
			self.publish_jobs(&items),
			self.notify_best_effort(&tenant, &items),
			self.mark_best_effort(&items, &report.forwarding),
		);

		if forward_marked {
			let forwarded_to = report.forwarding.relayed_to().map(str::to_string);

			for item in &mut items {
				item.forwarded_to = forwarded_to.clone();
			}
		}

		match notified {
			Ok(sent) => report.notifications_sent = sent,
			Err(message) => report.notification_error = Some(message),
		}

		report.items = items;
		report.jobs_published = jobs_published;
		report.job_failures = job_failures;
		report.forward_marked = forward_marked;

		info!(
			tenant_id = %report.tenant_id,
			items = report.items.len(),
			skipped = report.skipped_attachments.len(),
			"Inbound email processed."
		);

		WebhookOutcome::Processed(Box::new(report))
	}

	async fn track_inbound(&self) {
		let Some(analytics) = self.collaborators.analytics.as_ref() else {
			return;
		};
		let event = TrackedEvent {
			event: INBOUND_EVENT.to_string(),
			icon: Some(INBOUND_EVENT_ICON.to_string()),
		};

		if let Err(err) = analytics.track(&event).await {
			warn!(error_kind = "analytics", error = %err, "Failed to track inbound email.");
		}
	}
}

fn unroutable(reason: Unroutable) -> WebhookOutcome {
	info!(error_kind = "unroutable", ?reason, "Inbound email could not be routed.");

	WebhookOutcome::Unroutable(reason)
}
