//! Persisted records.
//!
//! Every record is stored as a whole JSON document. Fields default when absent so that records
//! written by an older shape still load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::paper::Branch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub capabilities: Map<String, Value>,
	#[serde(default)]
	pub constraints: Map<String, Value>,
	/// Written once from the description; grounding always refers back to it.
	#[serde(default)]
	pub summary: String,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchMap {
	#[serde(default)]
	pub project_id: String,
	#[serde(default)]
	pub clusters: Vec<Branch>,
	#[serde(default)]
	pub total_papers: usize,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub created_at: OffsetDateTime,
	/// Set when the build failed; `clusters` is empty in that case.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Set when the build succeeded without any papers to partition.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notice: Option<String>,
}
impl ResearchMap {
	pub fn built(project_id: &str, clusters: Vec<Branch>, now: OffsetDateTime) -> Self {
		let total_papers = clusters.iter().map(|branch| branch.papers.len()).sum();

		Self {
			project_id: project_id.to_string(),
			clusters,
			total_papers,
			created_at: now,
			error: None,
			notice: None,
		}
	}

	pub fn failed(project_id: &str, error: impl Into<String>, now: OffsetDateTime) -> Self {
		Self {
			project_id: project_id.to_string(),
			clusters: Vec::new(),
			total_papers: 0,
			created_at: now,
			error: Some(error.into()),
			notice: None,
		}
	}

	pub fn papers(&self) -> impl Iterator<Item = &crate::paper::PaperWithSimilarity> {
		self.clusters.iter().flat_map(|branch| branch.papers.iter())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	Paper,
	Note,
	Decision,
	Other,
}
impl SourceKind {
	fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"paper" => Self::Paper,
			"note" => Self::Note,
			"decision" => Self::Decision,
			_ => Self::Other,
		}
	}
}

/// A weak reference from a note to something else.
///
/// Nothing checks that the target exists. Readers resolve it lazily and skip misses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLinkedSource")]
pub struct LinkedSource {
	pub kind: SourceKind,
	pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub project_id: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub linked_sources: Vec<LinkedSource>,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
	User,
	Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextUsage {
	pub papers_count: usize,
	pub notes_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
	pub role: ChatRole,
	#[serde(default)]
	pub content: String,
	#[serde(with = "crate::time_serde", default = "crate::time_serde::epoch")]
	pub timestamp: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_used: Option<ContextUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
	#[serde(default)]
	pub project_id: String,
	#[serde(default)]
	pub messages: Vec<ChatMessage>,
}
impl ChatHistory {
	pub fn empty(project_id: &str) -> Self {
		Self { project_id: project_id.to_string(), messages: Vec::new() }
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLinkedSource {
	Typed {
		#[serde(default, alias = "type")]
		kind: String,
		id: String,
	},
	Bare(String),
}
impl From<RawLinkedSource> for LinkedSource {
	fn from(raw: RawLinkedSource) -> Self {
		match raw {
			RawLinkedSource::Typed { kind, id } => Self { kind: SourceKind::parse(&kind), id },
			RawLinkedSource::Bare(id) => Self { kind: SourceKind::Other, id },
		}
	}
}
