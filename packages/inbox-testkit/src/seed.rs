//! Rows the webhook pipeline only reads: tenants, users and memberships.

use uuid::Uuid;

use crate::Result;
use inbox_storage::db::Db;

pub async fn team(db: &Db, inbox_id: &str, inbox_email: Option<&str>) -> Result<Uuid> {
	let id = sqlx::query_scalar(
		"INSERT INTO teams (name, inbox_id, inbox_email) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(format!("Team {inbox_id}"))
	.bind(inbox_id)
	.bind(inbox_email)
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

/// Creates a user and adds it to `team_id`; returns the user id.
pub async fn member(db: &Db, team_id: Uuid, full_name: &str) -> Result<Uuid> {
	let user_id: Uuid = sqlx::query_scalar(
		"INSERT INTO users (full_name, email, locale) VALUES ($1, $2, 'en') RETURNING id",
	)
	.bind(full_name)
	.bind(format!("{}@company.com", full_name.to_lowercase()))
	.fetch_one(&db.pool)
	.await?;

	sqlx::query("INSERT INTO users_on_team (team_id, user_id) VALUES ($1, $2)")
		.bind(team_id)
		.bind(user_id)
		.execute(&db.pool)
		.await?;

	Ok(user_id)
}
