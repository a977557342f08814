use serde::{Deserialize, Serialize};

use crate::{Error, LitmapService, Result, prompts};
use litmap_domain::{
	context,
	models::{ChatHistory, ChatMessage, ChatRole, ContextUsage, Note, ResearchMap},
	paper::PaperWithSimilarity,
};
use litmap_storage::{keys, records};

/// Prior messages replayed to the generator along with the packet: three user/assistant turns.
const HISTORY_MESSAGES: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatRequest {
	pub project_id: Option<String>,
	pub message: Option<String>,
	pub selected_paper_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCounts {
	pub papers: usize,
	pub notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
	pub success: bool,
	pub response: String,
	pub context_used: ContextCounts,
}

impl LitmapService {
	/// Answers one chat turn from a bounded context packet.
	///
	/// History is written only after the generator answers, so a failed turn leaves no trace.
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		Error::require(&[
			("projectId", req.project_id.as_deref()),
			("message", req.message.as_deref()),
		])?;

		let project_id = req.project_id.unwrap_or_default();
		let question = req.message.unwrap_or_default().trim().to_string();
		let project = self.get_project(&project_id).await?;
		let map: Option<ResearchMap> =
			records::load(self.store.as_ref(), &keys::research_key(&project_id)).await?;
		let candidates: Vec<PaperWithSimilarity> =
			map.iter().flat_map(|map| map.papers()).cloned().collect();
		let notes: Vec<Note> = records::load_prefixed(self.store.as_ref(), keys::NOTE_PREFIX).await?;
		let selection = req.selected_paper_ids.unwrap_or_default();
		let packet = context::build_context_packet(&project, &candidates, &selection, &notes);
		let recent = self.chat_history(&project_id).await?.messages;
		let recent = &recent[recent.len().saturating_sub(HISTORY_MESSAGES)..];
		let messages = prompts::chat_messages(&packet, recent, &question);
		let answer =
			self.providers.generator.generate_text(&self.cfg.providers.llm, &messages).await?;
		let usage = ContextUsage {
			papers_count: packet.selected_papers.len(),
			notes_count: packet.linked_notes.len(),
		};

		self.append_turn(&project_id, &question, &answer, usage).await?;

		tracing::info!(
			project_id = %project_id,
			papers = usage.papers_count,
			notes = usage.notes_count,
			"Chat turn answered."
		);

		Ok(ChatResponse {
			success: true,
			response: answer,
			context_used: ContextCounts { papers: usage.papers_count, notes: usage.notes_count },
		})
	}

	/// The project's history, or an empty one when nothing was recorded yet.
	pub async fn chat_history(&self, project_id: &str) -> Result<ChatHistory> {
		let history: Option<ChatHistory> =
			records::load(self.store.as_ref(), &keys::chat_key(project_id)).await?;

		Ok(history.unwrap_or_else(|| ChatHistory::empty(project_id)))
	}

	pub async fn clear_chat_history(&self, project_id: &str) -> Result<()> {
		let lock = self.chat_lock(project_id);
		let result = {
			let _guard = lock.lock().await;

			self.store.delete(&keys::chat_key(project_id)).await
		};

		self.release_chat_lock(project_id, lock);
		result?;

		Ok(())
	}

	async fn append_turn(
		&self,
		project_id: &str,
		question: &str,
		answer: &str,
		usage: ContextUsage,
	) -> Result<()> {
		let lock = self.chat_lock(project_id);
		let result = {
			let _guard = lock.lock().await;

			self.write_turn(project_id, question, answer, usage).await
		};

		self.release_chat_lock(project_id, lock);

		result
	}

	async fn write_turn(
		&self,
		project_id: &str,
		question: &str,
		answer: &str,
		usage: ContextUsage,
	) -> Result<()> {
		let mut history = self.chat_history(project_id).await?;
		let now = self.now();

		history.project_id = project_id.to_string();
		history.messages.push(ChatMessage {
			role: ChatRole::User,
			content: question.to_string(),
			timestamp: now,
			context_used: None,
		});
		history.messages.push(ChatMessage {
			role: ChatRole::Assistant,
			content: answer.to_string(),
			timestamp: now,
			context_used: Some(usage),
		});

		records::save(self.store.as_ref(), &keys::chat_key(project_id), &history).await?;

		Ok(())
	}
}
