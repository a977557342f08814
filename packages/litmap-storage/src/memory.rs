use std::{collections::HashMap, future, sync::RwLock};

use serde_json::Value;

use crate::{BoxFuture, KvStore, Result};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RwLock<HashMap<String, Value>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}
impl KvStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		let value = self.entries.read().unwrap_or_else(|err| err.into_inner()).get(key).cloned();

		Box::pin(future::ready(Ok(value)))
	}

	fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>> {
		self.entries.write().unwrap_or_else(|err| err.into_inner()).insert(key.to_string(), value);

		Box::pin(future::ready(Ok(())))
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		self.entries.write().unwrap_or_else(|err| err.into_inner()).remove(key);

		Box::pin(future::ready(Ok(())))
	}

	fn get_all(&self) -> BoxFuture<'_, Result<HashMap<String, Value>>> {
		let entries = self.entries.read().unwrap_or_else(|err| err.into_inner()).clone();

		Box::pin(future::ready(Ok(entries)))
	}
}
