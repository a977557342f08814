use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

const WHAT_WORKED_KEYS: [&str; 2] = ["whatWorked", "what_worked"];
const LIMITATIONS_KEYS: [&str; 1] = ["limitations"];
const LESSONS_KEYS: [&str; 2] = ["lessons", "lessons_learned"];
const CONSTRAINTS_KEYS: [&str; 1] = ["constraints"];

/// Structured takeaways extracted from an abstract. Every field is a list, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvidenceRecord {
	pub what_worked: Vec<String>,
	pub limitations: Vec<String>,
	pub lessons: Vec<String>,
	pub constraints: Vec<String>,
}
impl EvidenceRecord {
	/// Reads a record from generator output.
	///
	/// The value must be an object. A field may be absent or null, which reads as an empty list,
	/// but a present field must be an array of strings; anything else rejects the whole record.
	pub fn from_generated(value: &Value, limits: &EvidenceLimits) -> Result<Self> {
		let Some(object) = value.as_object() else {
			return Err(Error::MalformedEvidence {
				message: "Generator output is not a JSON object.".to_string(),
			});
		};
		let field = |keys: &[&str], name: &str| -> Result<Vec<String>> {
			let raw = keys.iter().find_map(|key| object.get(*key)).unwrap_or(&Value::Null);

			read_items(raw, name, limits)
		};

		Ok(Self {
			what_worked: field(&WHAT_WORKED_KEYS, "whatWorked")?,
			limitations: field(&LIMITATIONS_KEYS, "limitations")?,
			lessons: field(&LESSONS_KEYS, "lessons")?,
			constraints: field(&CONSTRAINTS_KEYS, "constraints")?,
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceLimits {
	pub max_items_per_field: usize,
	pub max_item_chars: usize,
}
impl Default for EvidenceLimits {
	fn default() -> Self {
		Self { max_items_per_field: 5, max_item_chars: 240 }
	}
}

fn read_items(raw: &Value, name: &str, limits: &EvidenceLimits) -> Result<Vec<String>> {
	let items = match raw {
		Value::Null => return Ok(Vec::new()),
		Value::Array(items) => items,
		_ => {
			return Err(Error::MalformedEvidence { message: format!("{name} must be an array.") });
		},
	};
	let mut out = Vec::with_capacity(items.len().min(limits.max_items_per_field));

	for item in items {
		let Some(text) = item.as_str() else {
			return Err(Error::MalformedEvidence {
				message: format!("{name} must contain only strings."),
			});
		};
		let text = text.trim();

		if text.is_empty() {
			continue;
		}
		if out.len() == limits.max_items_per_field {
			break;
		}

		out.push(truncate_chars(text, limits.max_item_chars));
	}

	Ok(out)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
		None => text.to_string(),
	}
}
