//! In-memory collaborators that record every call and fail on request.

use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use inbox_domain::notification::NotificationMessage;
use inbox_providers::{analytics::TrackedEvent, email::OutboundEmail};
use inbox_service::{
	BoxFuture, Collaborators, EmailRelay, Error, EventTracker, InboxStore, JobQueue,
	NotificationService, ObjectStore, Result,
};
use inbox_storage::models::{InboxItem, NewInboxItem, Tenant, TenantMember};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[derive(Default)]
pub struct MemoryInboxStore {
	tenants: Mutex<Vec<Tenant>>,
	members: Mutex<Vec<TenantMember>>,
	items: Mutex<Vec<InboxItem>>,
	pub lookups: AtomicUsize,
	pub inserts: AtomicUsize,
	pub marks: AtomicUsize,
	pub fail_insert: AtomicBool,
	pub fail_members: AtomicBool,
	pub fail_mark: AtomicBool,
}
impl MemoryInboxStore {
	pub fn add_tenant(&self, inbox_id: &str, inbox_email: Option<&str>) -> Tenant {
		let tenant = Tenant {
			id: Uuid::new_v4(),
			inbox_id: inbox_id.to_string(),
			inbox_email: inbox_email.map(str::to_string),
		};

		lock(&self.tenants).push(tenant.clone());

		tenant
	}

	pub fn add_member(&self, tenant: &Tenant, full_name: &str) -> TenantMember {
		let user_id = Uuid::new_v4();
		let member = TenantMember {
			team_id: tenant.id,
			user_id,
			subscriber_id: user_id.to_string(),
			full_name: Some(full_name.to_string()),
			email: Some(format!("{}@company.com", full_name.to_lowercase())),
			avatar_url: None,
			locale: Some("en".to_string()),
		};

		lock(&self.members).push(member.clone());

		member
	}

	pub fn items(&self) -> Vec<InboxItem> {
		lock(&self.items).clone()
	}

	pub fn calls(&self) -> usize {
		self.lookups.load(Ordering::SeqCst)
			+ self.inserts.load(Ordering::SeqCst)
			+ self.marks.load(Ordering::SeqCst)
	}
}

impl InboxStore for MemoryInboxStore {
	fn find_tenant<'a>(&'a self, inbox_id: &'a str) -> BoxFuture<'a, Result<Option<Tenant>>> {
		Box::pin(async move {
			self.lookups.fetch_add(1, Ordering::SeqCst);

			Ok(lock(&self.tenants).iter().find(|tenant| tenant.inbox_id == inbox_id).cloned())
		})
	}

	fn list_members<'a>(&'a self, team_id: Uuid) -> BoxFuture<'a, Result<Vec<TenantMember>>> {
		Box::pin(async move {
			if self.fail_members.load(Ordering::SeqCst) {
				return Err(Error::Storage { message: "members unavailable".to_string() });
			}

			Ok(lock(&self.members).iter().filter(|member| member.team_id == team_id).cloned().collect())
		})
	}

	fn insert_items<'a>(
		&'a self,
		items: &'a [NewInboxItem],
	) -> BoxFuture<'a, Result<Vec<InboxItem>>> {
		Box::pin(async move {
			self.inserts.fetch_add(1, Ordering::SeqCst);

			if self.fail_insert.load(Ordering::SeqCst) {
				return Err(Error::Storage { message: "insert failed".to_string() });
			}

			let mut stored = lock(&self.items);

			for item in items {
				if stored.iter().any(|row| row.team_id == item.team_id && row.file_name == item.file_name)
				{
					return Err(Error::Storage {
						message: format!("duplicate file_name {}", item.file_name),
					});
				}
			}

			let created_at = OffsetDateTime::now_utc();
			let rows = items
				.iter()
				.map(|item| InboxItem {
					id: item.id,
					team_id: item.team_id,
					sender_email: item.sender_email.clone(),
					sender_name: item.sender_name.clone(),
					subject: item.subject.clone(),
					file_path: item.file_path.clone(),
					file_name: item.file_name.clone(),
					content_type: item.content_type.clone(),
					size: item.size,
					forwarded_to: None,
					created_at,
				})
				.collect::<Vec<_>>();

			stored.extend(rows.iter().cloned());

			Ok(rows)
		})
	}

	fn mark_forwarded<'a>(
		&'a self,
		items: &'a [InboxItem],
		forwarded_to: &'a str,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			self.marks.fetch_add(1, Ordering::SeqCst);

			if self.fail_mark.load(Ordering::SeqCst) {
				return Err(Error::Storage { message: "upsert failed".to_string() });
			}

			let mut stored = lock(&self.items);
			let mut updated = 0;

			for row in stored.iter_mut() {
				if items.iter().any(|item| item.id == row.id) {
					row.forwarded_to = Some(forwarded_to.to_string());
					updated += 1;
				}
			}

			Ok(updated)
		})
	}
}

/// Object store keyed by `bucket/path`. Refuses to overwrite.
#[derive(Default)]
pub struct MemoryObjectStore {
	objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
	failing_names: Mutex<Vec<String>>,
	delay: Mutex<Option<Duration>>,
	pub uploads: AtomicUsize,
}
impl MemoryObjectStore {
	/// Fails every upload whose path contains `fragment`.
	pub fn fail_paths_containing(&self, fragment: &str) {
		lock(&self.failing_names).push(fragment.to_string());
	}

	pub fn delay_uploads(&self, delay: Duration) {
		*lock(&self.delay) = Some(delay);
	}

	pub fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
		lock(&self.objects).get(&format!("{bucket}/{path}")).map(|(_, bytes)| bytes.clone())
	}

	pub fn keys(&self) -> Vec<String> {
		let mut keys = lock(&self.objects).keys().cloned().collect::<Vec<_>>();

		keys.sort();

		keys
	}
}

impl ObjectStore for MemoryObjectStore {
	fn upload<'a>(
		&'a self,
		bucket: &'a str,
		path: &'a str,
		bytes: &'a [u8],
		content_type: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			self.uploads.fetch_add(1, Ordering::SeqCst);

			let delay = *lock(&self.delay);

			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}
			if lock(&self.failing_names).iter().any(|fragment| path.contains(fragment.as_str())) {
				return Err(Error::ObjectStore { message: format!("upload of {path} failed") });
			}

			let key = format!("{bucket}/{path}");
			let mut objects = lock(&self.objects);

			if objects.contains_key(&key) {
				return Err(Error::ObjectStore { message: format!("{key} already exists") });
			}

			objects.insert(key, (content_type.to_string(), bytes.to_vec()));

			Ok(path.to_string())
		})
	}
}

#[derive(Default)]
pub struct RecordingJobQueue {
	published: Mutex<Vec<(String, Value)>>,
	/// The next `n` publications fail.
	pub failures_remaining: AtomicUsize,
}
impl RecordingJobQueue {
	pub fn published(&self) -> Vec<(String, Value)> {
		lock(&self.published).clone()
	}
}

impl JobQueue for RecordingJobQueue {
	fn publish<'a>(&'a self, event_name: &'a str, payload: &'a Value) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let failed = self
				.failures_remaining
				.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
				.is_ok();

			if failed {
				return Err(Error::Provider { message: "job queue unavailable".to_string() });
			}

			lock(&self.published).push((event_name.to_string(), payload.clone()));

			Ok(())
		})
	}
}

#[derive(Default)]
pub struct RecordingNotifier {
	batches: Mutex<Vec<Vec<NotificationMessage>>>,
	pub fail: AtomicBool,
}
impl RecordingNotifier {
	pub fn batches(&self) -> Vec<Vec<NotificationMessage>> {
		lock(&self.batches).clone()
	}
}

impl NotificationService for RecordingNotifier {
	fn bulk_publish<'a>(&'a self, messages: &'a [NotificationMessage]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			lock(&self.batches).push(messages.to_vec());

			if self.fail.load(Ordering::SeqCst) {
				return Err(Error::Provider { message: "notification service unavailable".to_string() });
			}

			Ok(())
		})
	}
}

#[derive(Default)]
pub struct RecordingRelay {
	sent: Mutex<Vec<OutboundEmail>>,
	pub fail: AtomicBool,
}
impl RecordingRelay {
	pub fn sent(&self) -> Vec<OutboundEmail> {
		lock(&self.sent).clone()
	}
}

impl EmailRelay for RecordingRelay {
	fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			lock(&self.sent).push(email.clone());

			if self.fail.load(Ordering::SeqCst) {
				return Err(Error::Provider { message: "relay rejected the message".to_string() });
			}

			Ok(Uuid::new_v4().to_string())
		})
	}
}

#[derive(Default)]
pub struct RecordingTracker {
	events: Mutex<Vec<TrackedEvent>>,
	pub fail: AtomicBool,
}
impl RecordingTracker {
	pub fn events(&self) -> Vec<TrackedEvent> {
		lock(&self.events).clone()
	}
}

impl EventTracker for RecordingTracker {
	fn track<'a>(&'a self, event: &'a TrackedEvent) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			lock(&self.events).push(event.clone());

			if self.fail.load(Ordering::SeqCst) {
				return Err(Error::Provider { message: "analytics unavailable".to_string() });
			}

			Ok(())
		})
	}
}

/// One of every fake, kept by the test for inspection after the pipeline ran.
#[derive(Clone, Default)]
pub struct Fakes {
	pub store: Arc<MemoryInboxStore>,
	pub objects: Arc<MemoryObjectStore>,
	pub jobs: Arc<RecordingJobQueue>,
	pub notifications: Arc<RecordingNotifier>,
	pub email: Arc<RecordingRelay>,
	pub analytics: Arc<RecordingTracker>,
}
impl Fakes {
	pub fn collaborators(&self) -> Collaborators {
		Collaborators {
			store: self.store.clone(),
			objects: self.objects.clone(),
			jobs: self.jobs.clone(),
			notifications: self.notifications.clone(),
			email: self.email.clone(),
			analytics: Some(self.analytics.clone()),
		}
	}
}
