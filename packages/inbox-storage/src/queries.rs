use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{InboxItem, NewInboxItem, Tenant, TenantMember},
};

const INBOX_COLUMNS: &str = "\
id,
	team_id,
	sender_email,
	sender_name,
	subject,
	file_path,
	file_name,
	content_type,
	size,
	forwarded_to,
	created_at";

pub async fn find_tenant_by_inbox_id<'e, E>(executor: E, inbox_id: &str) -> Result<Option<Tenant>>
where
	E: PgExecutor<'e>,
{
	let tenant = sqlx::query_as::<_, Tenant>(
		"SELECT id, inbox_id, inbox_email FROM teams WHERE inbox_id = $1",
	)
	.bind(inbox_id)
	.fetch_optional(executor)
	.await?;

	Ok(tenant)
}

pub async fn list_tenant_members<'e, E>(executor: E, team_id: Uuid) -> Result<Vec<TenantMember>>
where
	E: PgExecutor<'e>,
{
	let members = sqlx::query_as::<_, TenantMember>(
		"\
SELECT
	m.team_id,
	u.id AS user_id,
	u.id::text AS subscriber_id,
	u.full_name,
	u.email,
	u.avatar_url,
	u.locale
FROM users_on_team m
JOIN users u ON u.id = m.user_id
WHERE m.team_id = $1
ORDER BY m.created_at ASC, u.id ASC",
	)
	.bind(team_id)
	.fetch_all(executor)
	.await?;

	Ok(members)
}

/// Inserts every item in one statement and returns the persisted rows in input order.
pub async fn insert_inbox_items<'e, E>(executor: E, items: &[NewInboxItem]) -> Result<Vec<InboxItem>>
where
	E: PgExecutor<'e>,
{
	if items.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
		"\
INSERT INTO inbox (
	id,
	team_id,
	sender_email,
	sender_name,
	subject,
	file_path,
	file_name,
	content_type,
	size
) ",
	);

	builder.push_values(items, |mut row, item| {
		row.push_bind(item.id)
			.push_bind(item.team_id)
			.push_bind(item.sender_email.as_str())
			.push_bind(item.sender_name.as_str())
			.push_bind(item.subject.as_str())
			.push_bind(item.file_path.clone())
			.push_bind(item.file_name.as_str())
			.push_bind(item.content_type.as_str())
			.push_bind(item.size);
	});
	builder.push(" RETURNING ");
	builder.push(INBOX_COLUMNS);

	let rows = builder.build_query_as::<InboxItem>().fetch_all(executor).await?;

	order_like(items, rows)
}

/// Records the forwarding target on already persisted rows, keyed by primary key.
pub async fn upsert_forwarded_to<'e, E>(
	executor: E,
	items: &[InboxItem],
	forwarded_to: &str,
) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	if items.is_empty() {
		return Ok(0);
	}

	let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
		"\
INSERT INTO inbox (
	id,
	team_id,
	sender_email,
	sender_name,
	subject,
	file_path,
	file_name,
	content_type,
	size,
	forwarded_to
) ",
	);

	builder.push_values(items, |mut row, item| {
		row.push_bind(item.id)
			.push_bind(item.team_id)
			.push_bind(item.sender_email.as_str())
			.push_bind(item.sender_name.as_str())
			.push_bind(item.subject.as_str())
			.push_bind(item.file_path.clone())
			.push_bind(item.file_name.as_str())
			.push_bind(item.content_type.as_str())
			.push_bind(item.size)
			.push_bind(forwarded_to);
	});
	builder.push(" ON CONFLICT (id) DO UPDATE SET forwarded_to = EXCLUDED.forwarded_to");

	let result = builder.build().execute(executor).await?;

	Ok(result.rows_affected())
}

pub async fn list_inbox_items<'e, E>(executor: E, team_id: Uuid) -> Result<Vec<InboxItem>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {INBOX_COLUMNS} FROM inbox WHERE team_id = $1 ORDER BY created_at ASC, file_name ASC"
	);
	let items = sqlx::query_as::<_, InboxItem>(&sql).bind(team_id).fetch_all(executor).await?;

	Ok(items)
}

fn order_like(items: &[NewInboxItem], mut rows: Vec<InboxItem>) -> Result<Vec<InboxItem>> {
	let mut ordered = Vec::with_capacity(items.len());

	for item in items {
		let Some(pos) = rows.iter().position(|row| row.id == item.id) else {
			return Err(Error::Conflict(format!("Inserted inbox row {} was not returned.", item.id)));
		};

		ordered.push(rows.swap_remove(pos));
	}

	Ok(ordered)
}
