use serde_json::json;

use litmap_config::Postgres;
use litmap_storage::{KvStore, db::Db, pg::PgStore};
use litmap_testkit::TestDatabase;

async fn store(test_db: &TestDatabase) -> PgStore {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	PgStore::new(db)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LITMAP_PG_DSN to run."]
async fn schema_bootstrap_is_repeatable() {
	let Some(base_dsn) = litmap_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_repeatable; set LITMAP_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let store = store(&test_db).await;

	store.db().ensure_schema().await.expect("Second bootstrap failed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'kv_entries'",
	)
	.fetch_one(&store.db().pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LITMAP_PG_DSN to run."]
async fn pg_store_honors_kv_contract() {
	let Some(base_dsn) = litmap_testkit::env_dsn() else {
		eprintln!("Skipping pg_store_honors_kv_contract; set LITMAP_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let store = store(&test_db).await;

	assert_eq!(store.get("project_p1").await.expect("get failed"), None);

	store.set("project_p1", json!({ "id": "p1", "summary": "a" })).await.expect("set failed");
	store.set("project_p1", json!({ "id": "p1" })).await.expect("set failed");

	assert_eq!(store.get("project_p1").await.expect("get failed"), Some(json!({ "id": "p1" })));

	store.set("note_n1", json!({ "projectId": "p1" })).await.expect("set failed");

	let all = store.get_all().await.expect("get_all failed");

	assert_eq!(all.len(), 2);

	store.delete("note_n1").await.expect("delete failed");
	store.delete("note_n1").await.expect("repeat delete failed");

	assert_eq!(store.get("note_n1").await.expect("get failed"), None);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
