pub mod db;
pub mod keys;
pub mod memory;
pub mod pg;
pub mod records;

mod error;

pub use error::Error;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use litmap_config::Storage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Whole-document key-value persistence.
///
/// `get` answers `None` for an absent key, `set` overwrites (last writer wins), `delete` is
/// idempotent, and `get_all` makes no ordering promise.
pub trait KvStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

	fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>>;

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>>;

	fn get_all(&self) -> BoxFuture<'_, Result<HashMap<String, Value>>>;
}

/// Opens the configured backend.
pub async fn open(cfg: &Storage) -> Result<Arc<dyn KvStore>> {
	match (cfg.backend.as_str(), cfg.postgres.as_ref()) {
		("postgres", Some(postgres)) => {
			let db = db::Db::connect(postgres).await?;

			db.ensure_schema().await?;

			tracing::info!(backend = "postgres", "Storage ready.");

			Ok(Arc::new(pg::PgStore::new(db)))
		},
		("postgres", None) => Err(Error::InvalidArgument(
			"storage.postgres is required when storage.backend is postgres.".to_string(),
		)),
		_ => {
			tracing::info!(backend = "memory", "Storage ready.");

			Ok(Arc::new(memory::MemoryStore::new()))
		},
	}
}
