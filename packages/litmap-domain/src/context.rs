//! Bounded grounding context for question answering.

use std::{cmp::Ordering, collections::HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
	evidence::EvidenceRecord,
	models::{Note, Project},
	paper::PaperWithSimilarity,
};

/// Upper bound on papers in a packet, with or without an explicit selection.
pub const MAX_PACKET_PAPERS: usize = 5;
/// Upper bound on notes in a packet.
pub const MAX_PACKET_NOTES: usize = 5;

/// Everything a grounded answer is allowed to draw on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextPacket {
	pub project_summary: String,
	pub constraints: Map<String, Value>,
	pub selected_papers: Vec<PaperWithSimilarity>,
	/// Always empty: there is no persisted evidence card store.
	pub evidence_cards: Vec<EvidenceRecord>,
	pub linked_notes: Vec<Note>,
}

/// Builds the packet for one chat turn.
///
/// Papers: when `explicit_selection_ids` is non-empty, the first [`MAX_PACKET_PAPERS`] candidates
/// whose id is in that set, in candidate order. Otherwise the [`MAX_PACKET_PAPERS`] candidates with the highest
/// `similarity`; equal scores keep their candidate order.
///
/// Notes: the project's notes, newest `created_at` first, capped at [`MAX_PACKET_NOTES`].
pub fn build_context_packet(
	project: &Project,
	candidates: &[PaperWithSimilarity],
	explicit_selection_ids: &[String],
	notes: &[Note],
) -> ContextPacket {
	ContextPacket {
		project_summary: project.summary.clone(),
		constraints: project.constraints.clone(),
		selected_papers: select_papers(candidates, explicit_selection_ids),
		evidence_cards: Vec::new(),
		linked_notes: select_notes(&project.id, notes),
	}
}

pub fn select_papers(
	candidates: &[PaperWithSimilarity],
	explicit_selection_ids: &[String],
) -> Vec<PaperWithSimilarity> {
	if !explicit_selection_ids.is_empty() {
		let wanted: HashSet<&str> = explicit_selection_ids.iter().map(String::as_str).collect();

		return candidates
			.iter()
			.filter(|paper| wanted.contains(paper.paper_id()))
			.take(MAX_PACKET_PAPERS)
			.cloned()
			.collect();
	}

	let mut ranked: Vec<&PaperWithSimilarity> = candidates.iter().collect();

	// `sort_by` is stable, so ties keep candidate order.
	ranked.sort_by(|lhs, rhs| rank_key(rhs.similarity).total_cmp(&rank_key(lhs.similarity)));

	ranked.into_iter().take(MAX_PACKET_PAPERS).cloned().collect()
}

pub fn select_notes(project_id: &str, notes: &[Note]) -> Vec<Note> {
	let mut owned: Vec<&Note> = notes.iter().filter(|note| note.project_id == project_id).collect();

	owned.sort_by(|lhs, rhs| newest_first(lhs, rhs));

	owned.into_iter().take(MAX_PACKET_NOTES).cloned().collect()
}

fn rank_key(similarity: f32) -> f32 {
	if similarity.is_finite() { similarity } else { 0.0 }
}

/// Orders notes by `created_at`, newest first.
pub fn newest_first(lhs: &Note, rhs: &Note) -> Ordering {
	rhs.created_at.cmp(&lhs.created_at)
}
