use std::{
	collections::HashMap,
	hash::Hash,
	sync::{Arc, Mutex},
};

use time::{Duration, OffsetDateTime};

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
}
impl ManualClock {
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: Duration) {
		let mut now = self.now.lock().unwrap_or_else(|err| err.into_inner());

		*now += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.lock().unwrap_or_else(|err| err.into_inner())
	}
}

/// In-memory cache whose entries expire `max_age` after insertion.
pub struct TtlCache<K, V> {
	max_age: Duration,
	clock: Arc<dyn Clock>,
	entries: Mutex<HashMap<K, CacheEntry<V>>>,
}
impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash,
	V: Clone,
{
	pub fn new(max_age: Duration, clock: Arc<dyn Clock>) -> Self {
		Self { max_age, clock, entries: Mutex::new(HashMap::new()) }
	}

	pub fn get(&self, key: &K) -> Option<V> {
		let now = self.clock.now();
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let fresh = entries.get(key).map(|entry| now - entry.stored_at < self.max_age)?;

		if !fresh {
			entries.remove(key);

			return None;
		}

		entries.get(key).map(|entry| entry.value.clone())
	}

	/// Stores `value` and drops every other entry that has already expired.
	pub fn insert(&self, key: K, value: V) {
		let stored_at = self.clock.now();
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.retain(|_, entry| stored_at - entry.stored_at < self.max_age);
		entries.insert(key, CacheEntry { value, stored_at });
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

struct CacheEntry<V> {
	value: V,
	stored_at: OffsetDateTime,
}
