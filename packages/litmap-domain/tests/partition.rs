use rand::{SeedableRng, rngs::StdRng};

use litmap_domain::{
	paper::Paper,
	partition::{self, Assignment, EmbeddedPaper, UNLABELED_GROUP},
	ranking::{self, BranchRanker, SyntheticDecay},
	similarity::cosine_similarity,
};

fn paper(id: &str, approach: &str) -> Paper {
	Paper {
		paper_id: id.to_string(),
		title: format!("Paper {id}"),
		approach: approach.to_string(),
		..Default::default()
	}
}

fn embedded(id: &str, embedding: &[f32]) -> EmbeddedPaper {
	EmbeddedPaper { paper: paper(id, ""), embedding: embedding.to_vec() }
}

fn branch_ids(papers: &[litmap_domain::paper::PaperWithSimilarity]) -> Vec<&str> {
	papers.iter().map(|paper| paper.paper_id()).collect()
}

#[test]
fn cosine_is_symmetric_and_bounded() {
	let cases: [(&[f32], &[f32]); 4] = [
		(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]),
		(&[1.0, 0.0], &[-1.0, 0.0]),
		(&[0.5, -0.25, 4.0], &[0.5, -0.25, 4.0]),
		(&[1e-3, 7.0], &[-2.0, 1e3]),
	];

	for (lhs, rhs) in cases {
		let forward = cosine_similarity(lhs, rhs);
		let backward = cosine_similarity(rhs, lhs);

		assert_eq!(forward, backward);
		assert!((-1.0..=1.0).contains(&forward), "Out of range: {forward}");
	}

	assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
	assert!((cosine_similarity(&[2.0, 2.0], &[1.0, 1.0]) - 1.0).abs() < 1e-6);
}

#[test]
fn cosine_of_zero_vector_is_zero() {
	assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
	assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]), 0.0);
	assert_eq!(cosine_similarity(&[], &[]), 0.0);
	assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
}

#[test]
fn label_grouping_keeps_every_paper_under_the_cap() {
	let papers = vec![
		paper("p1", "enzymatic"),
		paper("p2", "computational"),
		paper("p3", "enzymatic"),
		paper("p4", "microbial"),
		paper("p5", "computational"),
	];
	let groups = partition::group_by_label(&papers, 5);
	let total: usize = groups.iter().map(|group| group.papers.len()).sum();

	assert_eq!(total, papers.len());
	assert_eq!(
		groups.iter().map(|group| group.label.as_str()).collect::<Vec<_>>(),
		vec!["enzymatic", "computational", "microbial"]
	);
	assert_eq!(
		groups[0].papers.iter().map(|paper| paper.paper_id.as_str()).collect::<Vec<_>>(),
		vec!["p1", "p3"]
	);
}

#[test]
fn overflow_groups_are_dropped() {
	let papers: Vec<Paper> = ["a", "b", "c", "d", "e", "f", "g", "a"]
		.iter()
		.enumerate()
		.map(|(idx, approach)| paper(&format!("p{idx}"), approach))
		.collect();
	let groups = partition::group_by_label(&papers, 5);

	assert_eq!(groups.len(), 5);
	assert!(groups.iter().all(|group| group.label != "f" && group.label != "g"));
	assert_eq!(groups[0].papers.len(), 2);
	assert_eq!(partition::overflow_labels(&papers, 5), vec!["f".to_string(), "g".to_string()]);

	let total: usize = groups.iter().map(|group| group.papers.len()).sum();

	assert_eq!(total, 6);
}

#[test]
fn blank_approach_falls_into_unlabeled_group() {
	let papers = vec![paper("p1", "  "), paper("p2", ""), paper("p3", "enzymatic")];
	let groups = partition::group_by_label(&papers, 5);

	assert_eq!(groups[0].label, UNLABELED_GROUP);
	assert_eq!(groups[0].papers.len(), 2);
}

#[test]
fn empty_input_yields_no_branches() {
	let mut rng = StdRng::seed_from_u64(7);

	assert!(partition::group_by_label(&[], 5).is_empty());
	assert!(partition::kmeans(&[], 3, 10, &[1.0, 0.0], &mut rng).is_empty());
}

#[test]
fn synthetic_decay_scores_by_branch_index() {
	let papers = vec![
		paper("p1", "a"),
		paper("p2", "b"),
		paper("p3", "c"),
		paper("p4", "a"),
	];
	let branches =
		ranking::rank_label_groups(partition::group_by_label(&papers, 5), &SyntheticDecay::default());

	assert_eq!(branches.len(), 3);
	assert_eq!(branches[0].branch_id, "branch_1");
	assert_eq!(branches[0].label, "a");
	assert!((branches[0].avg_similarity - 0.85).abs() < 1e-6);
	assert!((branches[1].papers[0].similarity - 0.80).abs() < 1e-6);
	assert!((branches[2].avg_similarity - 0.75).abs() < 1e-6);
	assert_eq!(branch_ids(&branches[0].papers), vec!["p1", "p4"]);
}

#[test]
fn synthetic_decay_never_goes_negative() {
	let decay = SyntheticDecay::default();

	assert_eq!(decay.score(40, 0, &Paper::default()), 0.0);
}

#[test]
fn custom_ranker_replaces_synthetic_scores() {
	struct ByCitations;
	impl BranchRanker for ByCitations {
		fn score(&self, _branch_index: usize, _position: usize, paper: &Paper) -> f32 {
			(paper.citation_count as f32 / 100.0).min(1.0)
		}
	}

	let mut cited = paper("p1", "a");

	cited.citation_count = 50;

	let branches =
		ranking::rank_label_groups(partition::group_by_label(&[cited, paper("p2", "a")], 5), &ByCitations);

	assert!((branches[0].papers[0].similarity - 0.5).abs() < 1e-6);
	assert!((branches[0].avg_similarity - 0.25).abs() < 1e-6);
}

#[test]
fn fewer_papers_than_k_become_singletons() {
	let papers = vec![embedded("p1", &[1.0, 0.0]), embedded("p2", &[0.0, 1.0])];
	let mut rng = StdRng::seed_from_u64(1);
	let branches = partition::kmeans(&papers, 3, 10, &[1.0, 0.0], &mut rng);

	assert_eq!(branches.len(), papers.len());
	assert!(branches.iter().all(|branch| branch.papers.len() == 1));
	assert_eq!(branches[0].label, "cluster_1");
	assert!((branches[0].papers[0].similarity - 1.0).abs() < 1e-6);
	assert!(branches[1].papers[0].similarity.abs() < 1e-6);
}

#[test]
fn ties_go_to_the_first_centroid() {
	let embeddings = vec![vec![1.0, 1.0]];
	let centroids = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
	let assignments = partition::assign_to_centroids(&embeddings, &centroids);

	assert_eq!(assignments[0].centroid, 0);
}

#[test]
fn empty_centroid_keeps_previous_coordinates() {
	let embeddings = vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.8, 0.2]];
	let mut centroids = vec![vec![1.0, 0.0], vec![-1.0, 0.0]];
	let assignments = partition::assign_to_centroids(&embeddings, &centroids);

	assert!(assignments.iter().all(|assignment| assignment.centroid == 0));

	partition::recompute_centroids(&embeddings, &assignments, &mut centroids);

	assert_eq!(centroids[1], vec![-1.0, 0.0]);
	assert!((centroids[0][0] - 0.9).abs() < 1e-6);
	assert!((centroids[0][1] - 0.1).abs() < 1e-6);

	let second = partition::assign_to_centroids(&embeddings, &centroids);

	assert!(second.iter().all(|assignment| assignment.centroid == 0));
}

#[test]
fn recompute_ignores_unassigned_embeddings() {
	let embeddings = vec![vec![2.0, 0.0], vec![0.0, 4.0]];
	let assignments = vec![
		Assignment { centroid: 1, similarity: 1.0 },
		Assignment { centroid: 1, similarity: 1.0 },
	];
	let mut centroids = vec![vec![5.0, 5.0], vec![0.0, 0.0]];

	partition::recompute_centroids(&embeddings, &assignments, &mut centroids);

	assert_eq!(centroids, vec![vec![5.0, 5.0], vec![1.0, 2.0]]);
}

#[test]
fn kmeans_separates_clear_clusters() {
	let papers = vec![
		embedded("a1", &[1.0, 0.0, 0.0]),
		embedded("b1", &[0.0, 1.0, 0.0]),
		embedded("a2", &[0.95, 0.05, 0.0]),
		embedded("b2", &[0.05, 0.95, 0.0]),
		embedded("a3", &[0.9, 0.1, 0.0]),
		embedded("b3", &[0.1, 0.9, 0.0]),
	];

	for seed in 0..16 {
		let mut rng = StdRng::seed_from_u64(seed);
		let branches = partition::kmeans(&papers, 2, 10, &[1.0, 1.0, 0.0], &mut rng);
		let total: usize = branches.iter().map(|branch| branch.papers.len()).sum();

		assert_eq!(total, papers.len(), "Seed {seed} dropped papers.");
		assert_eq!(branches.len(), 2, "Seed {seed} did not find two clusters.");

		for branch in &branches {
			let prefix = &branch.papers[0].paper_id()[..1];

			assert!(branch.papers.iter().all(|paper| paper.paper_id().starts_with(prefix)));
			assert_eq!(branch.papers.len(), 3);
			assert!(branch.avg_similarity > 0.9);
		}

		assert_eq!(branches[0].label, "cluster_1");
		assert_eq!(branches[1].label, "cluster_2");
	}
}

#[test]
fn kmeans_is_deterministic_for_a_fixed_seed() {
	let papers: Vec<EmbeddedPaper> = (0..12)
		.map(|idx| {
			let angle = idx as f32 * 0.5;

			embedded(&format!("p{idx}"), &[angle.cos(), angle.sin(), (idx % 3) as f32])
		})
		.collect();
	let run = |seed| {
		let mut rng = StdRng::seed_from_u64(seed);

		partition::kmeans(&papers, 4, 8, &[1.0, 0.0, 0.0], &mut rng)
	};

	assert_eq!(run(42), run(42));
}

#[test]
fn kmeans_filters_clusters_left_empty() {
	let papers = vec![
		embedded("p1", &[1.0, 0.0]),
		embedded("p2", &[1.0, 0.0]),
		embedded("p3", &[1.0, 0.0]),
	];
	let mut rng = StdRng::seed_from_u64(3);
	let branches = partition::kmeans(&papers, 2, 5, &[1.0, 0.0], &mut rng);

	assert_eq!(branches.len(), 1);
	assert_eq!(branches[0].label, "cluster_1");
	assert_eq!(branch_ids(&branches[0].papers), vec!["p1", "p2", "p3"]);
}
