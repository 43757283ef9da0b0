use std::collections::BTreeMap;

use tracing::warn;
use uuid::Uuid;

use crate::{InboxService, Result};
use inbox_domain::inbound::InboundEmail;
use inbox_providers::email::{OutboundAttachment, OutboundEmail};
use inbox_storage::models::{InboxItem, Tenant};

pub const ENTITY_REF_HEADER: &str = "X-Entity-Ref-ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
	/// The tenant has no company inbox address.
	NotConfigured,
	Relayed { to: String, reference_id: String },
	Failed { to: String, message: String },
}
impl ForwardOutcome {
	pub fn relayed_to(&self) -> Option<&str> {
		match self {
			Self::Relayed { to, .. } => Some(to),
			_ => None,
		}
	}
}

impl InboxService {
	/// Relays the original email to the tenant's company inbox, if one is configured.
	pub async fn forward_email(&self, tenant: &Tenant, email: &InboundEmail) -> ForwardOutcome {
		let Some(to) = forwarding_address(tenant) else {
			return ForwardOutcome::NotConfigured;
		};
		let reference_id = Uuid::new_v4().simple().to_string();
		let message = compose_forward(email, to, &self.cfg.inbox.forward_from_address, &reference_id);

		match self.collaborators.email.send(&message).await {
			Ok(_) => ForwardOutcome::Relayed { to: to.to_string(), reference_id },
			Err(err) => {
				warn!(
					error_kind = "relay",
					tenant_id = %tenant.id,
					error = %err,
					"Failed to forward inbound email."
				);

				ForwardOutcome::Failed { to: to.to_string(), message: err.to_string() }
			},
		}
	}

	/// Records the forwarding target on every persisted item.
	pub async fn mark_forwarded(&self, items: &[InboxItem], forwarded_to: &str) -> Result<u64> {
		if items.is_empty() {
			return Ok(0);
		}

		self.collaborators.store.mark_forwarded(items, forwarded_to).await
	}

	pub(crate) async fn mark_best_effort(&self, items: &[InboxItem], forward: &ForwardOutcome) -> bool {
		let Some(to) = forward.relayed_to() else {
			return false;
		};

		match self.mark_forwarded(items, to).await {
			Ok(_) => true,
			Err(err) => {
				warn!(
					error_kind = "forward_mark",
					forwarded_to = to,
					error = %err,
					"Failed to record forwarding on inbox items."
				);

				false
			},
		}
	}
}

pub fn forwarding_address(tenant: &Tenant) -> Option<&str> {
	tenant.inbox_email.as_deref().map(str::trim).filter(|address| !address.is_empty())
}

/// Builds the relayed message: original subject, bodies and attachments, from the inbox sender.
///
/// Attachments that arrived without content cannot be relayed and are left out.
pub fn compose_forward(
	email: &InboundEmail,
	to: &str,
	from_address: &str,
	reference_id: &str,
) -> OutboundEmail {
	OutboundEmail {
		from: display_from(&email.sender_name, from_address),
		to: vec![to.to_string()],
		subject: email.subject.clone(),
		text: email.text_body.clone(),
		html: email.html_body.clone(),
		attachments: email
			.attachments
			.iter()
			.filter_map(|attachment| {
				Some(OutboundAttachment {
					filename: attachment.name.clone().unwrap_or_else(|| "attachment".to_string()),
					content: attachment.content.clone()?,
				})
			})
			.collect(),
		headers: BTreeMap::from([(ENTITY_REF_HEADER.to_string(), reference_id.to_string())]),
	}
}

fn display_from(sender_name: &str, from_address: &str) -> String {
	let name = sender_name
		.chars()
		.filter(|ch| !matches!(ch, '"' | '<' | '>') && !ch.is_control())
		.collect::<String>();
	let name = name.trim();

	if name.is_empty() { from_address.to_string() } else { format!("{name} <{from_address}>") }
}
