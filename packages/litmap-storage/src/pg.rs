use std::collections::HashMap;

use serde_json::Value;

use crate::{BoxFuture, KvStore, Result, db::Db};

pub struct PgStore {
	db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}
impl KvStore for PgStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move {
			let value: Option<Value> =
				sqlx::query_scalar("SELECT value FROM kv_entries WHERE key = $1")
					.bind(key)
					.fetch_optional(&self.db.pool)
					.await?;

			Ok(value)
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO kv_entries (key, value, updated_at)
VALUES ($1, $2, now())
ON CONFLICT (key) DO UPDATE
SET value = EXCLUDED.value,
	updated_at = EXCLUDED.updated_at",
			)
			.bind(key)
			.bind(value)
			.execute(&self.db.pool)
			.await?;

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query("DELETE FROM kv_entries WHERE key = $1")
				.bind(key)
				.execute(&self.db.pool)
				.await?;

			Ok(())
		})
	}

	fn get_all(&self) -> BoxFuture<'_, Result<HashMap<String, Value>>> {
		Box::pin(async move {
			let rows: Vec<(String, Value)> = sqlx::query_as("SELECT key, value FROM kv_entries")
				.fetch_all(&self.db.pool)
				.await?;

			Ok(rows.into_iter().collect())
		})
	}
}
