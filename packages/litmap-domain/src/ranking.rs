use crate::{
	paper::{Branch, Paper, PaperWithSimilarity},
	partition::LabelGroup,
};

/// Scores papers inside label-grouped branches.
///
/// Label grouping carries no geometric signal, so the score a paper shows in its branch comes
/// from an implementation of this trait.
pub trait BranchRanker
where
	Self: Send + Sync,
{
	fn score(&self, branch_index: usize, position: usize, paper: &Paper) -> f32;
}

/// Placeholder ranking: every paper in branch `i` scores `base - i * step`, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticDecay {
	pub base: f32,
	pub step: f32,
}
impl Default for SyntheticDecay {
	fn default() -> Self {
		Self { base: 0.85, step: 0.05 }
	}
}
impl BranchRanker for SyntheticDecay {
	fn score(&self, branch_index: usize, _position: usize, _paper: &Paper) -> f32 {
		(self.base - branch_index as f32 * self.step).clamp(0.0, 1.0)
	}
}

/// Turns label groups into branches, scoring each paper with `ranker`.
pub fn rank_label_groups(groups: Vec<LabelGroup>, ranker: &dyn BranchRanker) -> Vec<Branch> {
	groups
		.into_iter()
		.enumerate()
		.map(|(branch_index, group)| {
			let papers = group
				.papers
				.into_iter()
				.enumerate()
				.map(|(position, paper)| {
					let score = ranker.score(branch_index, position, &paper);

					PaperWithSimilarity::new(paper, score)
				})
				.collect();

			Branch::new(branch_index + 1, group.label, papers)
		})
		.collect()
}
