//! Production collaborators: Postgres for records and the HTTP clients for everything else.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
	BoxFuture, Collaborators, EmailRelay, Error, EventTracker, InboxStore, JobQueue,
	NotificationService, ObjectStore, Result,
};
use inbox_config::Config;
use inbox_domain::notification::NotificationMessage;
use inbox_providers::{
	analytics::{AnalyticsClient, TrackedEvent},
	email::{EmailClient, OutboundEmail},
	jobs::JobClient,
	notifications::NotificationClient,
	objects::ObjectStorageClient,
};
use inbox_storage::{
	db::Db,
	models::{InboxItem, NewInboxItem, Tenant, TenantMember},
	queries,
};

pub struct PgInboxStore {
	db: Db,
}
impl PgInboxStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

impl InboxStore for PgInboxStore {
	fn find_tenant<'a>(&'a self, inbox_id: &'a str) -> BoxFuture<'a, Result<Option<Tenant>>> {
		Box::pin(async move { Ok(queries::find_tenant_by_inbox_id(&self.db.pool, inbox_id).await?) })
	}

	fn list_members<'a>(&'a self, team_id: Uuid) -> BoxFuture<'a, Result<Vec<TenantMember>>> {
		Box::pin(async move { Ok(queries::list_tenant_members(&self.db.pool, team_id).await?) })
	}

	fn insert_items<'a>(
		&'a self,
		items: &'a [NewInboxItem],
	) -> BoxFuture<'a, Result<Vec<InboxItem>>> {
		Box::pin(async move { Ok(queries::insert_inbox_items(&self.db.pool, items).await?) })
	}

	fn mark_forwarded<'a>(
		&'a self,
		items: &'a [InboxItem],
		forwarded_to: &'a str,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			Ok(queries::upsert_forwarded_to(&self.db.pool, items, forwarded_to).await?)
		})
	}
}

impl ObjectStore for ObjectStorageClient {
	fn upload<'a>(
		&'a self,
		bucket: &'a str,
		path: &'a str,
		bytes: &'a [u8],
		content_type: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			ObjectStorageClient::upload(self, bucket, path, bytes, content_type)
				.await
				.map_err(|err| Error::ObjectStore { message: err.to_string() })
		})
	}
}

impl JobQueue for JobClient {
	fn publish<'a>(&'a self, event_name: &'a str, payload: &'a Value) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(self.send_event(event_name, payload).await?) })
	}
}

impl NotificationService for NotificationClient {
	fn bulk_publish<'a>(&'a self, messages: &'a [NotificationMessage]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(self.trigger_bulk(messages).await?) })
	}
}

impl EmailRelay for EmailClient {
	fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(EmailClient::send(self, email).await?) })
	}
}

impl EventTracker for AnalyticsClient {
	fn track<'a>(&'a self, event: &'a TrackedEvent) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(AnalyticsClient::track(self, event).await?) })
	}
}

impl Collaborators {
	/// Builds one client per collaborator from `cfg`, sharing `db` for the record store.
	pub fn from_config(cfg: &Config, db: Db) -> Result<Self> {
		let analytics = match cfg.providers.analytics.as_ref() {
			Some(analytics) =>
				Some(Arc::new(AnalyticsClient::new(analytics)?) as Arc<dyn EventTracker>),
			None => None,
		};

		Ok(Self {
			store: Arc::new(PgInboxStore::new(db)),
			objects: Arc::new(ObjectStorageClient::new(&cfg.storage.objects)?),
			jobs: Arc::new(JobClient::new(&cfg.providers.jobs)?),
			notifications: Arc::new(NotificationClient::new(&cfg.providers.notifications)?),
			email: Arc::new(EmailClient::new(&cfg.providers.email)?),
			analytics,
		})
	}
}
