//! Partitioning papers into labeled, non-overlapping branches.
//!
//! Two strategies share the [`Branch`] output shape:
//!
//! - [`group_by_label`] buckets papers by their `approach` tag and leaves scoring to a
//!   [`BranchRanker`](crate::ranking::BranchRanker).
//! - [`kmeans`] clusters papers by embedding with cosine assignment.

use rand::Rng;

use crate::{
	paper::{Branch, Paper, PaperWithSimilarity},
	similarity,
};

/// Label used for papers whose `approach` tag is blank.
pub const UNLABELED_GROUP: &str = "Other";

/// Papers sharing one `approach` tag, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroup {
	pub label: String,
	pub papers: Vec<Paper>,
}

/// A paper paired with the vector used for centroid clustering.
#[derive(Debug, Clone)]
pub struct EmbeddedPaper {
	pub paper: Paper,
	pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
	pub centroid: usize,
	pub similarity: f32,
}

/// Groups papers by `approach`, keeping group keys in first-seen order.
///
/// At most `max_groups` groups are returned. Groups discovered after the cap is reached are
/// dropped together with their papers; see [`overflow_labels`] to report what was left out.
pub fn group_by_label(papers: &[Paper], max_groups: usize) -> Vec<LabelGroup> {
	let mut groups = discover_groups(papers);

	groups.truncate(max_groups);

	groups
}

/// Labels that [`group_by_label`] drops for the given cap, in first-seen order.
pub fn overflow_labels(papers: &[Paper], max_groups: usize) -> Vec<String> {
	discover_groups(papers).into_iter().skip(max_groups).map(|group| group.label).collect()
}

/// Clusters papers into at most `k` branches by cosine similarity.
///
/// With fewer than `k` papers every paper becomes its own branch, scored against `reference`
/// (typically the project embedding). Otherwise `k` distinct papers are sampled from `rng` as
/// initial centroids and the assign/recompute loop runs exactly `max_iterations` times (at least
/// once). Branches that end up empty are omitted; survivors are labeled `cluster_{n}` from 1.
pub fn kmeans<R>(
	papers: &[EmbeddedPaper],
	k: usize,
	max_iterations: usize,
	reference: &[f32],
	rng: &mut R,
) -> Vec<Branch>
where
	R: Rng + ?Sized,
{
	if papers.is_empty() {
		return Vec::new();
	}

	let k = k.max(1);

	if papers.len() < k {
		return singleton_branches(papers, reference);
	}

	let embeddings: Vec<&[f32]> = papers.iter().map(|paper| paper.embedding.as_slice()).collect();
	let mut centroids: Vec<Vec<f32>> = rand::seq::index::sample(rng, papers.len(), k)
		.iter()
		.map(|idx| papers[idx].embedding.clone())
		.collect();
	let mut assignments = Vec::new();

	for _ in 0..max_iterations.max(1) {
		assignments = assign_to_centroids(&embeddings, &centroids);

		recompute_centroids(&embeddings, &assignments, &mut centroids);
	}

	let mut members: Vec<Vec<PaperWithSimilarity>> = vec![Vec::new(); centroids.len()];

	for (paper, assignment) in papers.iter().zip(assignments) {
		members[assignment.centroid]
			.push(PaperWithSimilarity::new(paper.paper.clone(), assignment.similarity));
	}

	members
		.into_iter()
		.filter(|papers| !papers.is_empty())
		.enumerate()
		.map(|(idx, papers)| {
			let ordinal = idx + 1;

			Branch::new(ordinal, format!("cluster_{ordinal}"), papers)
		})
		.collect()
}

/// Assigns each embedding to its most similar centroid.
///
/// Ties go to the lowest centroid index.
pub fn assign_to_centroids<V, C>(embeddings: &[V], centroids: &[C]) -> Vec<Assignment>
where
	V: AsRef<[f32]>,
	C: AsRef<[f32]>,
{
	embeddings
		.iter()
		.map(|embedding| {
			let mut best = Assignment { centroid: 0, similarity: f32::NEG_INFINITY };

			for (idx, centroid) in centroids.iter().enumerate() {
				let similarity =
					similarity::cosine_similarity(embedding.as_ref(), centroid.as_ref());

				if similarity > best.similarity {
					best = Assignment { centroid: idx, similarity };
				}
			}

			if best.similarity.is_finite() { best } else { Assignment { centroid: 0, similarity: 0.0 } }
		})
		.collect()
}

/// Moves every centroid to the coordinate-wise mean of its members.
///
/// A centroid with no members keeps its previous coordinates.
pub fn recompute_centroids<V>(
	embeddings: &[V],
	assignments: &[Assignment],
	centroids: &mut [Vec<f32>],
) where
	V: AsRef<[f32]>,
{
	for (idx, centroid) in centroids.iter_mut().enumerate() {
		let mut sum = vec![0.0_f32; centroid.len()];
		let mut count = 0_usize;

		for (embedding, assignment) in embeddings.iter().zip(assignments) {
			if assignment.centroid != idx {
				continue;
			}

			for (acc, value) in sum.iter_mut().zip(embedding.as_ref()) {
				*acc += value;
			}

			count += 1;
		}

		if count == 0 {
			continue;
		}

		for value in &mut sum {
			*value /= count as f32;
		}

		*centroid = sum;
	}
}

fn discover_groups(papers: &[Paper]) -> Vec<LabelGroup> {
	let mut groups: Vec<LabelGroup> = Vec::new();

	for paper in papers {
		let label = match paper.approach.trim() {
			"" => UNLABELED_GROUP,
			approach => approach,
		};

		match groups.iter_mut().find(|group| group.label == label) {
			Some(group) => group.papers.push(paper.clone()),
			None => groups.push(LabelGroup { label: label.to_string(), papers: vec![paper.clone()] }),
		}
	}

	groups
}

fn singleton_branches(papers: &[EmbeddedPaper], reference: &[f32]) -> Vec<Branch> {
	papers
		.iter()
		.enumerate()
		.map(|(idx, paper)| {
			let ordinal = idx + 1;
			let similarity = similarity::cosine_similarity(&paper.embedding, reference);

			Branch::new(ordinal, format!("cluster_{ordinal}"), vec![PaperWithSimilarity::new(
				paper.paper.clone(),
				similarity,
			)])
		})
		.collect()
}
