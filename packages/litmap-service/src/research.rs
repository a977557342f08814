use serde_json::Value;

use crate::{Error, LitmapService, Result, prompts};
use litmap_domain::{
	models::{Project, ResearchMap},
	paper::{Branch, Paper},
	partition::{self, EmbeddedPaper},
	ranking,
};
use litmap_storage::{keys, records};

const EMPTY_POOL_NOTICE: &str = "The generator returned no papers for this project.";

/// How generated papers are turned into branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Label,
	Centroid,
}
impl Strategy {
	pub fn from_config(raw: &str) -> Self {
		match raw {
			"centroid" => Self::Centroid,
			_ => Self::Label,
		}
	}
}

impl LitmapService {
	/// Generates papers for the project and replaces its research map.
	///
	/// A failed build still leaves a map behind: an empty one carrying the failure message, so
	/// readers can tell "never built" from "build failed".
	pub async fn build_research_map(&self, project_id: &str) -> Result<ResearchMap> {
		let project = self.get_project(project_id).await?;
		let key = keys::research_key(project_id);

		match self.partition_project(&project).await {
			Ok(map) => {
				records::save(self.store.as_ref(), &key, &map).await?;

				tracing::info!(
					project_id,
					papers = map.total_papers,
					branches = map.clusters.len(),
					"Research map built."
				);

				Ok(map)
			},
			Err(err) => {
				let message = match err {
					Error::Provider { message } | Error::ResearchBuild { message } => message,
					other => other.to_string(),
				};
				let failed = ResearchMap::failed(project_id, message.clone(), self.now());

				tracing::warn!(project_id, error = %message, "Research map build failed.");
				records::save(self.store.as_ref(), &key, &failed).await?;

				Err(Error::ResearchBuild { message })
			},
		}
	}

	pub async fn get_research_map(&self, project_id: &str) -> Result<ResearchMap> {
		records::load(self.store.as_ref(), &keys::research_key(project_id))
			.await?
			.ok_or_else(|| Error::not_found("Research map", project_id))
	}

	async fn partition_project(&self, project: &Project) -> Result<ResearchMap> {
		let papers = self.generate_papers(project).await?;

		if papers.is_empty() {
			let mut map = ResearchMap::built(&project.id, Vec::new(), self.now());

			map.notice = Some(EMPTY_POOL_NOTICE.to_string());

			return Ok(map);
		}

		let clusters = match Strategy::from_config(&self.cfg.research.strategy) {
			Strategy::Label => self.label_branches(&project.id, &papers),
			Strategy::Centroid => self.centroid_branches(project, papers).await?,
		};

		Ok(ResearchMap::built(&project.id, clusters, self.now()))
	}

	fn label_branches(&self, project_id: &str, papers: &[Paper]) -> Vec<Branch> {
		let max_groups = self.cfg.research.max_branches as usize;
		let dropped = partition::overflow_labels(papers, max_groups);

		if !dropped.is_empty() {
			tracing::warn!(project_id, ?dropped, "Label groups beyond max_branches were dropped.");
		}

		ranking::rank_label_groups(partition::group_by_label(papers, max_groups), self.ranker.as_ref())
	}

	async fn centroid_branches(&self, project: &Project, papers: Vec<Paper>) -> Result<Vec<Branch>> {
		let Some(embedding_cfg) = self.cfg.providers.embedding.as_ref() else {
			return Err(Error::InvalidRequest {
				message: "providers.embedding is required for centroid clustering.".to_string(),
			});
		};
		let anchor = if project.summary.trim().is_empty() { &project.description } else { &project.summary };
		let mut texts = Vec::with_capacity(papers.len() + 1);

		texts.push(anchor.clone());
		texts.extend(papers.iter().map(Paper::embedding_text));

		let mut vectors =
			self.providers.embedding.embed(embedding_cfg, &texts).await?.into_iter();
		let Some(reference) = vectors.next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let embedded: Vec<EmbeddedPaper> = papers
			.into_iter()
			.zip(vectors)
			.map(|(paper, embedding)| EmbeddedPaper { paper, embedding })
			.collect();

		if embedded.len() + 1 != texts.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned fewer vectors than inputs.".to_string(),
			});
		}

		let mut rng = self.rng();

		Ok(partition::kmeans(
			&embedded,
			self.cfg.research.max_branches as usize,
			self.cfg.research.max_iterations as usize,
			&reference,
			&mut rng,
		))
	}

	async fn generate_papers(&self, project: &Project) -> Result<Vec<Paper>> {
		let messages = prompts::paper_messages(
			project,
			self.cfg.research.paper_count,
			self.cfg.research.max_branches,
		);
		let generated =
			self.providers.generator.generate_json(&self.cfg.providers.llm, &messages).await?;

		parse_generated_papers(&generated)
	}
}

/// Reads `{ "papers": [...] }` from generator output.
///
/// An empty array is a valid, empty pool. A non-empty array in which no item is a usable paper
/// (an object with a title) is treated as a failed generation.
pub fn parse_generated_papers(generated: &Value) -> Result<Vec<Paper>> {
	let Some(items) = generated.get("papers").and_then(Value::as_array) else {
		return Err(Error::Provider {
			message: "Generator output is missing a papers array.".to_string(),
		});
	};
	let mut papers = Vec::with_capacity(items.len());

	for item in items {
		let Ok(mut paper) = serde_json::from_value::<Paper>(item.clone()) else {
			continue;
		};

		if paper.title.trim().is_empty() {
			continue;
		}
		if paper.paper_id.trim().is_empty() || papers.iter().any(|seen: &Paper| seen.paper_id == paper.paper_id) {
			paper.paper_id = format!("paper_{}", papers.len() + 1);
		}

		papers.push(paper);
	}

	if papers.is_empty() && !items.is_empty() {
		return Err(Error::Provider {
			message: "Generator returned no usable papers.".to_string(),
		});
	}

	Ok(papers)
}
