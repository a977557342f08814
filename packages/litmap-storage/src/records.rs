//! Typed access to JSON records.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, KvStore, Result};

pub async fn load<T>(store: &dyn KvStore, key: &str) -> Result<Option<T>>
where
	T: DeserializeOwned,
{
	let Some(value) = store.get(key).await? else {
		return Ok(None);
	};
	let record = serde_json::from_value(value)
		.map_err(|source| Error::Decode { key: key.to_string(), source })?;

	Ok(Some(record))
}

pub async fn save<T>(store: &dyn KvStore, key: &str, record: &T) -> Result<()>
where
	T: Serialize,
{
	let value = serde_json::to_value(record)
		.map_err(|source| Error::Encode { key: key.to_string(), source })?;

	store.set(key, value).await
}

/// Decodes every record whose key starts with `prefix`, in no particular order.
pub async fn load_prefixed<T>(store: &dyn KvStore, prefix: &str) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	let entries = store.get_all().await?;
	let mut records = Vec::new();

	for (key, value) in entries {
		if !key.starts_with(prefix) {
			continue;
		}

		let record =
			serde_json::from_value(value).map_err(|source| Error::Decode { key, source })?;

		records.push(record);
	}

	Ok(records)
}
