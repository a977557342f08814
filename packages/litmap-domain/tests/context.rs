use serde_json::{Map, Value, json};
use time::{Duration, OffsetDateTime};

use litmap_domain::{
	context::{self, MAX_PACKET_NOTES, MAX_PACKET_PAPERS},
	evidence::{EvidenceLimits, EvidenceRecord},
	models::{Note, Project},
	paper::{Paper, PaperWithSimilarity},
};

fn project() -> Project {
	let mut constraints = Map::new();

	constraints.insert("budget".to_string(), Value::String("small".to_string()));

	Project {
		id: "proj".to_string(),
		description: "biodegradable plastics via enzymes".to_string(),
		capabilities: Map::new(),
		constraints,
		summary: "Enzymatic degradation of PET.".to_string(),
		created_at: OffsetDateTime::UNIX_EPOCH,
		updated_at: OffsetDateTime::UNIX_EPOCH,
	}
}

fn candidate(id: &str, similarity: f32) -> PaperWithSimilarity {
	PaperWithSimilarity::new(
		Paper { paper_id: id.to_string(), title: format!("Paper {id}"), ..Default::default() },
		similarity,
	)
}

fn note(id: &str, project_id: &str, minutes: i64) -> Note {
	let at = OffsetDateTime::UNIX_EPOCH + Duration::minutes(minutes);

	Note {
		id: id.to_string(),
		project_id: project_id.to_string(),
		content: format!("Note {id}"),
		linked_sources: Vec::new(),
		created_at: at,
		updated_at: at,
	}
}

fn ids(papers: &[PaperWithSimilarity]) -> Vec<&str> {
	papers.iter().map(|paper| paper.paper_id()).collect()
}

#[test]
fn top_five_by_similarity_without_selection() {
	let candidates: Vec<PaperWithSimilarity> = [0.3, 0.8, 0.1, 0.5, 0.7, 0.2, 0.6, 0.4]
		.iter()
		.map(|score| candidate(&format!("s{}", (score * 10.0_f32).round() as u32), *score))
		.collect();
	let packet = context::build_context_packet(&project(), &candidates, &[], &[]);

	assert_eq!(packet.selected_papers.len(), MAX_PACKET_PAPERS);
	assert_eq!(ids(&packet.selected_papers), vec!["s8", "s7", "s6", "s5", "s4"]);
	assert_eq!(
		packet.selected_papers.iter().map(|paper| paper.similarity).collect::<Vec<_>>(),
		vec![0.8, 0.7, 0.6, 0.5, 0.4]
	);
}

#[test]
fn equal_scores_keep_candidate_order() {
	let candidates = vec![
		candidate("a", 0.5),
		candidate("b", 0.9),
		candidate("c", 0.5),
		candidate("d", 0.5),
		candidate("e", 0.5),
		candidate("f", 0.5),
	];
	let selected = context::select_papers(&candidates, &[]);

	assert_eq!(ids(&selected), vec!["b", "a", "c", "d", "e"]);
}

#[test]
fn non_finite_similarity_ranks_as_zero() {
	let candidates = vec![candidate("nan", f32::NAN), candidate("low", 0.1), candidate("neg", -0.2)];
	let selected = context::select_papers(&candidates, &[]);

	assert_eq!(ids(&selected), vec!["low", "nan", "neg"]);
}

#[test]
fn explicit_selection_keeps_candidate_order() {
	let candidates: Vec<PaperWithSimilarity> =
		(1..=5).map(|idx| candidate(&format!("id{idx}"), idx as f32 / 10.0)).collect();
	let selection = vec!["id3".to_string(), "id1".to_string()];
	let packet = context::build_context_packet(&project(), &candidates, &selection, &[]);

	assert_eq!(ids(&packet.selected_papers), vec!["id1", "id3"]);
}

#[test]
fn explicit_selection_is_capped_in_pool_order() {
	let candidates: Vec<PaperWithSimilarity> =
		(1..=7).map(|idx| candidate(&format!("id{idx}"), 0.1 * idx as f32)).collect();
	let selection: Vec<String> = (1..=7).rev().map(|idx| format!("id{idx}")).collect();
	let selected = context::select_papers(&candidates, &selection);

	assert_eq!(selected.len(), MAX_PACKET_PAPERS);
	assert_eq!(
		selected.iter().map(|paper| paper.paper_id()).collect::<Vec<_>>(),
		vec!["id1", "id2", "id3", "id4", "id5"]
	);
}

#[test]
fn unknown_selection_ids_select_nothing() {
	let candidates = vec![candidate("id1", 0.9)];
	let selection = vec!["gone".to_string()];

	assert!(context::select_papers(&candidates, &selection).is_empty());
}

#[test]
fn notes_are_capped_to_the_most_recent_five() {
	// Stored order deliberately differs from creation order.
	let notes: Vec<Note> = [3, 7, 1, 8, 2, 6, 4, 5]
		.iter()
		.map(|minute| note(&format!("n{minute}"), "proj", *minute))
		.collect();
	let packet = context::build_context_packet(&project(), &[], &[], &notes);

	assert_eq!(packet.linked_notes.len(), MAX_PACKET_NOTES);
	assert_eq!(
		packet.linked_notes.iter().map(|note| note.id.as_str()).collect::<Vec<_>>(),
		vec!["n8", "n7", "n6", "n5", "n4"]
	);
}

#[test]
fn notes_from_other_projects_are_ignored() {
	let notes = vec![note("mine", "proj", 1), note("theirs", "other", 2)];
	let selected = context::select_notes("proj", &notes);

	assert_eq!(selected.len(), 1);
	assert_eq!(selected[0].id, "mine");
}

#[test]
fn packet_copies_project_fields_and_leaves_inputs_untouched() {
	let project = project();
	let candidates = vec![candidate("b", 0.2), candidate("a", 0.9)];
	let notes = vec![note("n1", "proj", 1)];
	let before = (project.clone(), candidates.clone(), notes.clone());
	let packet = context::build_context_packet(&project, &candidates, &[], &notes);

	assert_eq!(packet.project_summary, "Enzymatic degradation of PET.");
	assert_eq!(packet.constraints.get("budget"), Some(&Value::String("small".to_string())));
	assert!(packet.evidence_cards.is_empty());
	assert_eq!((project, candidates, notes), before);
}

#[test]
fn evidence_reads_all_four_fields() {
	let value = json!({
		"whatWorked": ["Cutinase variant doubled PET conversion."],
		"limitations": ["Only tested at 60C."],
		"lessons_learned": ["Thermostability matters."],
		"constraints": ["Requires amorphous PET."],
	});
	let record =
		EvidenceRecord::from_generated(&value, &EvidenceLimits::default()).expect("parse failed");

	assert_eq!(record.what_worked, vec!["Cutinase variant doubled PET conversion."]);
	assert_eq!(record.lessons, vec!["Thermostability matters."]);
	assert_eq!(record.constraints.len(), 1);
}

#[test]
fn evidence_missing_or_null_fields_read_as_empty() {
	let value = json!({ "whatWorked": ["x"], "limitations": null });
	let record =
		EvidenceRecord::from_generated(&value, &EvidenceLimits::default()).expect("parse failed");

	assert!(record.limitations.is_empty());
	assert!(record.lessons.is_empty());
	assert!(record.constraints.is_empty());

	let json = serde_json::to_value(&record).expect("serialize failed");

	assert_eq!(json["limitations"], json!([]));
	assert_eq!(json["constraints"], json!([]));
}

#[test]
fn evidence_rejects_wrong_shapes() {
	let limits = EvidenceLimits::default();

	assert!(EvidenceRecord::from_generated(&json!(["not", "an", "object"]), &limits).is_err());
	assert!(EvidenceRecord::from_generated(&json!({ "limitations": "one string" }), &limits).is_err());
	assert!(EvidenceRecord::from_generated(&json!({ "lessons": [1, 2] }), &limits).is_err());
}

#[test]
fn evidence_items_are_trimmed_and_capped() {
	let limits = EvidenceLimits { max_items_per_field: 2, max_item_chars: 8 };
	let value = json!({ "whatWorked": ["  ", " first item ", "second item", "third"] });
	let record = EvidenceRecord::from_generated(&value, &limits).expect("parse failed");

	assert_eq!(record.what_worked, vec!["first it", "second i"]);
}
