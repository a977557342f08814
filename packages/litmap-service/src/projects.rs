use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, LitmapService, Result, prompts};
use litmap_domain::models::Project;
use litmap_storage::{keys, records};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateProjectRequest {
	pub description: Option<String>,
	pub capabilities: Map<String, Value>,
	pub constraints: Map<String, Value>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProjectRequest {
	pub description: Option<String>,
	pub capabilities: Option<Map<String, Value>>,
	pub constraints: Option<Map<String, Value>>,
}

impl LitmapService {
	pub async fn create_project(&self, req: CreateProjectRequest) -> Result<Project> {
		Error::require(&[("description", req.description.as_deref())])?;

		let description = req.description.unwrap_or_default().trim().to_string();
		let summary = self.summarize(&description, &req.capabilities, &req.constraints).await?;
		let now = self.now();
		let project = Project {
			id: Uuid::new_v4().to_string(),
			description,
			capabilities: req.capabilities,
			constraints: req.constraints,
			summary,
			created_at: now,
			updated_at: now,
		};

		records::save(self.store.as_ref(), &keys::project_key(&project.id), &project).await?;

		tracing::info!(project_id = %project.id, "Project created.");

		Ok(project)
	}

	pub async fn get_project(&self, project_id: &str) -> Result<Project> {
		records::load(self.store.as_ref(), &keys::project_key(project_id))
			.await?
			.ok_or_else(|| Error::not_found("Project", project_id))
	}

	/// All projects, newest first.
	pub async fn list_projects(&self) -> Result<Vec<Project>> {
		let mut projects: Vec<Project> =
			records::load_prefixed(self.store.as_ref(), keys::PROJECT_PREFIX).await?;

		projects.sort_by(|lhs, rhs| rhs.created_at.cmp(&lhs.created_at).then_with(|| lhs.id.cmp(&rhs.id)));

		Ok(projects)
	}

	/// Merges the given fields. The summary is regenerated only when the description changes.
	pub async fn update_project(
		&self,
		project_id: &str,
		req: UpdateProjectRequest,
	) -> Result<Project> {
		let mut project = self.get_project(project_id).await?;
		let mut resummarize = false;

		if let Some(description) = req.description {
			let description = description.trim().to_string();

			if description.is_empty() {
				return Err(Error::InvalidRequest {
					message: "description must be non-empty.".to_string(),
				});
			}
			if description != project.description {
				project.description = description;
				resummarize = true;
			}
		}
		if let Some(capabilities) = req.capabilities {
			project.capabilities = capabilities;
		}
		if let Some(constraints) = req.constraints {
			project.constraints = constraints;
		}
		if resummarize {
			project.summary =
				self.summarize(&project.description, &project.capabilities, &project.constraints).await?;
		}

		project.updated_at = self.now();

		records::save(self.store.as_ref(), &keys::project_key(&project.id), &project).await?;

		tracing::info!(project_id = %project.id, resummarized = resummarize, "Project updated.");

		Ok(project)
	}

	async fn summarize(
		&self,
		description: &str,
		capabilities: &Map<String, Value>,
		constraints: &Map<String, Value>,
	) -> Result<String> {
		let messages = prompts::summary_messages(description, capabilities, constraints);
		let summary =
			self.providers.generator.generate_text(&self.cfg.providers.llm, &messages).await?;

		Ok(summary.trim().to_string())
	}
}
