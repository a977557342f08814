use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, LitmapService, Result, prompts};
use litmap_domain::{
	context,
	models::{LinkedSource, Note, ResearchMap, SourceKind},
};
use litmap_storage::{keys, records};

const SOURCE_TITLE_CHARS: usize = 80;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateNoteRequest {
	pub project_id: Option<String>,
	pub content: Option<String>,
	pub linked_sources: Vec<LinkedSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateNoteRequest {
	pub content: Option<String>,
	pub linked_sources: Option<Vec<LinkedSource>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineAction {
	#[default]
	Clarify,
	Summarize,
	NextSteps,
}
impl RefineAction {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			"clarify" => Some(Self::Clarify),
			"summarize" => Some(Self::Summarize),
			"next_steps" => Some(Self::NextSteps),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefineRequest {
	pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
	pub note_id: String,
	pub action: RefineAction,
	pub refined: String,
}

/// A linked source whose target was found when the note was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
	pub kind: SourceKind,
	pub id: String,
	pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
	#[serde(flatten)]
	pub note: Note,
	pub resolved_sources: Vec<ResolvedSource>,
}

impl LitmapService {
	pub async fn create_note(&self, req: CreateNoteRequest) -> Result<Note> {
		Error::require(&[
			("projectId", req.project_id.as_deref()),
			("content", req.content.as_deref()),
		])?;

		let now = self.now();
		let note = Note {
			id: Uuid::new_v4().to_string(),
			project_id: req.project_id.unwrap_or_default().trim().to_string(),
			content: req.content.unwrap_or_default(),
			linked_sources: req.linked_sources,
			created_at: now,
			updated_at: now,
		};

		records::save(self.store.as_ref(), &keys::note_key(&note.id), &note).await?;

		tracing::info!(note_id = %note.id, project_id = %note.project_id, "Note created.");

		Ok(note)
	}

	/// The project's notes, newest first.
	pub async fn list_notes(&self, project_id: &str) -> Result<Vec<Note>> {
		let notes: Vec<Note> = records::load_prefixed(self.store.as_ref(), keys::NOTE_PREFIX).await?;
		let mut owned: Vec<Note> =
			notes.into_iter().filter(|note| note.project_id == project_id).collect();

		owned.sort_by(context::newest_first);

		Ok(owned)
	}

	pub async fn get_note(&self, note_id: &str) -> Result<NoteView> {
		let note = self.load_note(note_id).await?;
		let resolved_sources = self.resolve_sources(&note).await?;

		Ok(NoteView { note, resolved_sources })
	}

	pub async fn update_note(&self, note_id: &str, req: UpdateNoteRequest) -> Result<Note> {
		let mut note = self.load_note(note_id).await?;

		if let Some(content) = req.content {
			if content.trim().is_empty() {
				return Err(Error::InvalidRequest {
					message: "content must be non-empty.".to_string(),
				});
			}

			note.content = content;
		}
		if let Some(linked_sources) = req.linked_sources {
			note.linked_sources = linked_sources;
		}

		note.updated_at = self.now();

		records::save(self.store.as_ref(), &keys::note_key(&note.id), &note).await?;

		Ok(note)
	}

	pub async fn delete_note(&self, note_id: &str) -> Result<()> {
		let note = self.load_note(note_id).await?;

		self.store.delete(&keys::note_key(&note.id)).await?;

		tracing::info!(note_id = %note.id, "Note deleted.");

		Ok(())
	}

	/// Rewrites the note's content with the generator. The stored note is left unchanged.
	pub async fn refine_note(&self, note_id: &str, req: RefineRequest) -> Result<RefineResponse> {
		let note = self.load_note(note_id).await?;
		let action = match req.action.as_deref().filter(|raw| !raw.trim().is_empty()) {
			None => RefineAction::default(),
			Some(raw) => RefineAction::parse(raw).ok_or_else(|| Error::InvalidRequest {
				message: "action must be one of clarify, summarize, or next_steps.".to_string(),
			})?,
		};
		let project_summary = match self.get_project(&note.project_id).await {
			Ok(project) => project.summary,
			Err(Error::NotFound { .. }) => String::new(),
			Err(err) => return Err(err),
		};
		let messages = prompts::refine_messages(&note, action, &project_summary);
		let refined =
			self.providers.generator.generate_text(&self.cfg.providers.llm, &messages).await?;

		Ok(RefineResponse { note_id: note.id, action, refined })
	}

	async fn load_note(&self, note_id: &str) -> Result<Note> {
		records::load(self.store.as_ref(), &keys::note_key(note_id))
			.await?
			.ok_or_else(|| Error::not_found("Note", note_id))
	}

	/// Resolves weak references on read. Targets that no longer exist are skipped.
	async fn resolve_sources(&self, note: &Note) -> Result<Vec<ResolvedSource>> {
		if note.linked_sources.is_empty() {
			return Ok(Vec::new());
		}

		let map: Option<ResearchMap> =
			records::load(self.store.as_ref(), &keys::research_key(&note.project_id)).await?;
		let mut resolved = Vec::new();

		for source in &note.linked_sources {
			let paper_title = || {
				map.iter()
					.flat_map(|map| map.papers())
					.find(|paper| paper.paper_id() == source.id)
					.map(|paper| paper.paper.title.clone())
			};
			let title = match source.kind {
				SourceKind::Paper => paper_title(),
				SourceKind::Note => self.note_title(&source.id).await?,
				SourceKind::Other => match paper_title() {
					Some(title) => Some(title),
					None => self.note_title(&source.id).await?,
				},
				SourceKind::Decision => None,
			};

			if let Some(title) = title {
				resolved.push(ResolvedSource { kind: source.kind, id: source.id.clone(), title });
			}
		}

		Ok(resolved)
	}

	async fn note_title(&self, note_id: &str) -> Result<Option<String>> {
		let note: Option<Note> = records::load(self.store.as_ref(), &keys::note_key(note_id)).await?;

		Ok(note.map(|note| {
			let first_line = note.content.lines().next().unwrap_or_default().trim();

			first_line.chars().take(SOURCE_TITLE_CHARS).collect()
		}))
	}
}
