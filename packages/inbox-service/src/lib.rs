pub mod attachments;
pub mod defaults;
pub mod forward;
pub mod notify;
pub mod records;
pub mod webhook;

mod error;

pub use attachments::SkippedAttachment;
pub use error::{Error, Result};
pub use forward::ForwardOutcome;
pub use records::JobFailure;
pub use webhook::{ProcessReport, Unroutable, WebhookOutcome};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use uuid::Uuid;

use inbox_config::Config;
use inbox_domain::{notification::NotificationMessage, source::SourceVerifier};
use inbox_providers::{analytics::TrackedEvent, email::OutboundEmail};
use inbox_storage::models::{InboxItem, NewInboxItem, Tenant, TenantMember};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Relational store: tenant routing, members, and inbox rows.
pub trait InboxStore
where
	Self: Send + Sync,
{
	fn find_tenant<'a>(&'a self, inbox_id: &'a str) -> BoxFuture<'a, Result<Option<Tenant>>>;

	fn list_members<'a>(&'a self, team_id: Uuid) -> BoxFuture<'a, Result<Vec<TenantMember>>>;

	/// All-or-nothing batch insert returning the persisted rows.
	fn insert_items<'a>(
		&'a self,
		items: &'a [NewInboxItem],
	) -> BoxFuture<'a, Result<Vec<InboxItem>>>;

	fn mark_forwarded<'a>(
		&'a self,
		items: &'a [InboxItem],
		forwarded_to: &'a str,
	) -> BoxFuture<'a, Result<u64>>;
}

pub trait ObjectStore
where
	Self: Send + Sync,
{
	/// Returns the stored path relative to the bucket.
	fn upload<'a>(
		&'a self,
		bucket: &'a str,
		path: &'a str,
		bytes: &'a [u8],
		content_type: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait JobQueue
where
	Self: Send + Sync,
{
	fn publish<'a>(&'a self, event_name: &'a str, payload: &'a Value) -> BoxFuture<'a, Result<()>>;
}

pub trait NotificationService
where
	Self: Send + Sync,
{
	fn bulk_publish<'a>(&'a self, messages: &'a [NotificationMessage]) -> BoxFuture<'a, Result<()>>;
}

pub trait EmailRelay
where
	Self: Send + Sync,
{
	fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<String>>;
}

pub trait EventTracker
where
	Self: Send + Sync,
{
	fn track<'a>(&'a self, event: &'a TrackedEvent) -> BoxFuture<'a, Result<()>>;
}

/// Process-wide clients handed to the pipeline. Built once, shared by every request.
#[derive(Clone)]
pub struct Collaborators {
	pub store: Arc<dyn InboxStore>,
	pub objects: Arc<dyn ObjectStore>,
	pub jobs: Arc<dyn JobQueue>,
	pub notifications: Arc<dyn NotificationService>,
	pub email: Arc<dyn EmailRelay>,
	pub analytics: Option<Arc<dyn EventTracker>>,
}

pub struct InboxService {
	pub cfg: Config,
	pub verifier: SourceVerifier,
	pub collaborators: Collaborators,
}
impl InboxService {
	pub fn new(cfg: Config, collaborators: Collaborators) -> Result<Self> {
		let allowed = inbox_config::allowed_ips(&cfg.webhook)
			.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;

		Ok(Self { verifier: SourceVerifier::new(allowed), cfg, collaborators })
	}
}
