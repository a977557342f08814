use serde::{Deserialize, Serialize};

/// Number of authors kept on a paper once it is placed in a branch.
pub const BRANCH_AUTHOR_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAuthor")]
pub struct Author {
	pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Paper {
	pub paper_id: String,
	pub title: String,
	pub authors: Vec<Author>,
	pub year: Option<i32>,
	#[serde(rename = "abstract")]
	pub r#abstract: String,
	pub venue: String,
	pub citation_count: u64,
	/// Raw categorical tag used for label grouping.
	pub approach: String,
}
impl Paper {
	/// Text used when a paper needs to be embedded.
	pub fn embedding_text(&self) -> String {
		if self.r#abstract.trim().is_empty() {
			return self.title.clone();
		}

		format!("{}\n\n{}", self.title, self.r#abstract)
	}
}

/// A paper placed in a branch, carrying its rank signal within that branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperWithSimilarity {
	#[serde(flatten)]
	pub paper: Paper,
	pub similarity: f32,
}
impl PaperWithSimilarity {
	pub fn new(mut paper: Paper, similarity: f32) -> Self {
		paper.authors.truncate(BRANCH_AUTHOR_LIMIT);

		Self { paper, similarity }
	}

	pub fn paper_id(&self) -> &str {
		&self.paper.paper_id
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branch {
	pub branch_id: String,
	pub label: String,
	pub papers: Vec<PaperWithSimilarity>,
	pub avg_similarity: f32,
}
impl Branch {
	pub fn new(ordinal: usize, label: impl Into<String>, papers: Vec<PaperWithSimilarity>) -> Self {
		let avg_similarity = mean(papers.iter().map(|paper| paper.similarity));

		Self { branch_id: format!("branch_{ordinal}"), label: label.into(), papers, avg_similarity }
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuthor {
	Name(String),
	Object {
		#[serde(default)]
		name: String,
	},
}
impl From<RawAuthor> for Author {
	fn from(raw: RawAuthor) -> Self {
		match raw {
			RawAuthor::Name(name) | RawAuthor::Object { name } => Self { name },
		}
	}
}

pub(crate) fn mean(values: impl Iterator<Item = f32>) -> f32 {
	let (sum, count) = values.fold((0.0_f32, 0_usize), |(sum, count), value| (sum + value, count + 1));

	if count == 0 { 0.0 } else { sum / count as f32 }
}
