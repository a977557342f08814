use serde::{Deserialize, Serialize};
use serde_json::json;

use litmap_storage::{
	Error, KvStore,
	keys::{self, NOTE_PREFIX},
	memory::MemoryStore,
	records,
};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Record {
	project_id: String,
	content: String,
	tags: Vec<String>,
}
impl Default for Record {
	fn default() -> Self {
		Self { project_id: String::new(), content: String::new(), tags: vec!["untagged".to_string()] }
	}
}

#[tokio::test]
async fn get_of_absent_key_is_none() {
	let store = MemoryStore::new();

	assert_eq!(store.get("project_missing").await.expect("get failed"), None);
}

#[tokio::test]
async fn set_overwrites_whole_value() {
	let store = MemoryStore::new();

	store.set("k", json!({ "a": 1, "b": 2 })).await.expect("set failed");
	store.set("k", json!({ "a": 3 })).await.expect("set failed");

	assert_eq!(store.get("k").await.expect("get failed"), Some(json!({ "a": 3 })));
}

#[tokio::test]
async fn delete_is_idempotent() {
	let store = MemoryStore::new();

	store.set("k", json!(1)).await.expect("set failed");
	store.delete("k").await.expect("first delete failed");
	store.delete("k").await.expect("second delete failed");

	assert_eq!(store.get("k").await.expect("get failed"), None);
}

#[tokio::test]
async fn get_all_returns_every_entry() {
	let store = MemoryStore::new();

	store.set("a", json!(1)).await.expect("set failed");
	store.set("b", json!(2)).await.expect("set failed");

	let all = store.get_all().await.expect("get_all failed");

	assert_eq!(all.len(), 2);
	assert_eq!(all.get("b"), Some(&json!(2)));
}

#[tokio::test]
async fn typed_records_round_trip_and_tolerate_missing_fields() {
	let store = MemoryStore::new();
	let key = keys::note_key("n1");
	let record = Record {
		project_id: "p1".to_string(),
		content: "PETase works best at 30C.".to_string(),
		tags: Vec::new(),
	};

	records::save(&store, &key, &record).await.expect("save failed");

	let loaded: Option<Record> = records::load(&store, &key).await.expect("load failed");

	assert_eq!(loaded, Some(record));

	store.set("note_old", json!({ "projectId": "p1" })).await.expect("set failed");

	let old: Record =
		records::load(&store, "note_old").await.expect("load failed").expect("missing record");

	assert_eq!(old.content, "");
	assert_eq!(old.tags, vec!["untagged".to_string()]);
}

#[tokio::test]
async fn undecodable_record_is_a_storage_error() {
	let store = MemoryStore::new();

	store.set("note_bad", json!({ "projectId": 7 })).await.expect("set failed");

	let err = records::load::<Record>(&store, "note_bad").await.expect_err("expected error");

	assert!(matches!(err, Error::Decode { ref key, .. } if key == "note_bad"));
}

#[tokio::test]
async fn prefixed_scan_skips_other_record_kinds() {
	let store = MemoryStore::new();

	records::save(&store, &keys::note_key("n1"), &Record::default()).await.expect("save failed");
	records::save(&store, &keys::note_key("n2"), &Record::default()).await.expect("save failed");
	store.set(&keys::chat_key("p1"), json!({ "messages": [] })).await.expect("set failed");

	let notes: Vec<Record> = records::load_prefixed(&store, NOTE_PREFIX).await.expect("scan failed");

	assert_eq!(notes.len(), 2);
}
