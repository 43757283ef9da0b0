use uuid::Uuid;

use inbox_storage::{db::Db, models::NewInboxItem, queries};
use inbox_testkit::{TestDatabase, seed};

async fn bootstrapped(test_db: &TestDatabase) -> Db {
	test_db.bootstrap().await.expect("Failed to bootstrap test database.")
}

async fn seed_team(db: &Db, inbox_id: &str, inbox_email: Option<&str>) -> Uuid {
	seed::team(db, inbox_id, inbox_email).await.expect("Failed to seed team.")
}

fn draft(team_id: Uuid, file_name: &str) -> NewInboxItem {
	NewInboxItem {
		id: Uuid::new_v4(),
		team_id,
		sender_email: "billing@vendor.com".to_string(),
		sender_name: "Vendor".to_string(),
		subject: "Invoice".to_string(),
		file_path: vec![team_id.to_string(), "inbox".to_string(), file_name.to_string()],
		file_name: file_name.to_string(),
		content_type: "application/pdf".to_string(),
		size: 42,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INBOX_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = inbox_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set INBOX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;

	db.ensure_schema().await.expect("Second bootstrap must succeed.");

	for table in ["teams", "users", "users_on_team", "inbox"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INBOX_PG_DSN to run."]
async fn tenant_lookup_is_exact_and_case_sensitive() {
	let Some(base_dsn) = inbox_testkit::env_dsn() else {
		eprintln!("Skipping tenant_lookup_is_exact_and_case_sensitive; set INBOX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let team_id = seed_team(&db, "abc123", Some("finance@company.com")).await;
	let tenant = queries::find_tenant_by_inbox_id(&db.pool, "abc123")
		.await
		.expect("Lookup failed.")
		.expect("Tenant must exist.");

	assert_eq!(tenant.id, team_id);
	assert_eq!(tenant.inbox_email.as_deref(), Some("finance@company.com"));
	assert!(queries::find_tenant_by_inbox_id(&db.pool, "ABC123").await.expect("Lookup failed.").is_none());
	assert!(queries::find_tenant_by_inbox_id(&db.pool, "abc12").await.expect("Lookup failed.").is_none());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INBOX_PG_DSN to run."]
async fn batch_insert_returns_rows_and_marks_forwarding() {
	let Some(base_dsn) = inbox_testkit::env_dsn() else {
		eprintln!("Skipping batch_insert_returns_rows_and_marks_forwarding; set INBOX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let team_id = seed_team(&db, "abc123", Some("finance@company.com")).await;
	let drafts = vec![draft(team_id, "invoice-a1b.pdf"), draft(team_id, "invoice-c2d.pdf")];
	let rows = queries::insert_inbox_items(&db.pool, &drafts).await.expect("Insert failed.");

	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0].id, drafts[0].id);
	assert_eq!(rows[1].file_name, "invoice-c2d.pdf");
	assert_eq!(rows[0].file_path, drafts[0].file_path);
	assert!(rows.iter().all(|row| row.forwarded_to.is_none()));

	let updated = queries::upsert_forwarded_to(&db.pool, &rows, "finance@company.com")
		.await
		.expect("Upsert failed.");

	assert_eq!(updated, 2);

	let listed = queries::list_inbox_items(&db.pool, team_id).await.expect("List failed.");

	assert_eq!(listed.len(), 2);
	assert!(listed.iter().all(|row| row.forwarded_to.as_deref() == Some("finance@company.com")));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INBOX_PG_DSN to run."]
async fn duplicate_file_name_fails_the_whole_batch() {
	let Some(base_dsn) = inbox_testkit::env_dsn() else {
		eprintln!("Skipping duplicate_file_name_fails_the_whole_batch; set INBOX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let team_id = seed_team(&db, "abc123", None).await;
	let drafts = vec![draft(team_id, "receipt-x1y.pdf"), draft(team_id, "receipt-x1y.pdf")];

	assert!(queries::insert_inbox_items(&db.pool, &drafts).await.is_err());
	assert!(queries::list_inbox_items(&db.pool, team_id).await.expect("List failed.").is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INBOX_PG_DSN to run."]
async fn members_are_listed_with_subscriber_ids() {
	let Some(base_dsn) = inbox_testkit::env_dsn() else {
		eprintln!("Skipping members_are_listed_with_subscriber_ids; set INBOX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let team_id = seed_team(&db, "abc123", None).await;
	let other_team = seed_team(&db, "other", None).await;
	let mut user_ids = Vec::new();

	for (name, team) in [("Ada", team_id), ("Grace", team_id), ("Linus", other_team)] {
		user_ids.push(seed::member(&db, team, name).await.expect("Failed to seed member."));
	}

	let members = queries::list_tenant_members(&db.pool, team_id).await.expect("List failed.");

	assert_eq!(members.len(), 2);
	assert!(members.iter().all(|member| member.team_id == team_id));
	assert!(members.iter().all(|member| member.subscriber_id == member.user_id.to_string()));
	assert!(!members.iter().any(|member| member.user_id == user_ids[2]));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
