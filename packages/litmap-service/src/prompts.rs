use serde_json::{Map, Value, json};

use crate::notes::RefineAction;
use litmap_domain::{
	context::ContextPacket,
	models::{ChatMessage, ChatRole, Note, Project},
};

const SUMMARY_SYSTEM: &str = "\
You condense research project ideas. Write a neutral summary of at most four sentences that \
states the goal, the intended approach, and any hard constraints. Reply with the summary only.";

const PAPERS_SYSTEM: &str = "\
You are a research librarian mapping literature adjacent to a project idea. Reply with a JSON \
object of the form {\"papers\": [{\"paperId\": string, \"title\": string, \"authors\": \
[{\"name\": string}], \"year\": integer, \"abstract\": string, \"venue\": string, \
\"citationCount\": integer, \"approach\": string}]}. `approach` is a short lowercase tag naming \
the paper's method family; reuse the same tag for papers that share a method family.";

const CHAT_SYSTEM: &str = "\
You answer questions about a research project using only the context provided. Cite papers by \
title and notes by id when you rely on them. If the context is insufficient, say so plainly \
instead of guessing.";

const EVIDENCE_SYSTEM: &str = "\
You extract structured evidence from a paper abstract. Reply with a JSON object with exactly \
these keys, each an array of short strings: \"whatWorked\", \"limitations\", \"lessons\", \
\"constraints\". Use an empty array when the abstract says nothing for a key.";

fn message(role: &str, content: impl Into<String>) -> Value {
	json!({ "role": role, "content": content.into() })
}

fn render_map(map: &Map<String, Value>) -> String {
	if map.is_empty() {
		return "none".to_string();
	}

	map.iter()
		.map(|(key, value)| match value {
			Value::String(text) => format!("- {key}: {text}"),
			other => format!("- {key}: {other}"),
		})
		.collect::<Vec<_>>()
		.join("\n")
}

pub(crate) fn summary_messages(
	description: &str,
	capabilities: &Map<String, Value>,
	constraints: &Map<String, Value>,
) -> Vec<Value> {
	let user = format!(
		"Project description:\n{description}\n\nCapabilities:\n{}\n\nConstraints:\n{}",
		render_map(capabilities),
		render_map(constraints),
	);

	vec![message("system", SUMMARY_SYSTEM), message("user", user)]
}

pub(crate) fn paper_messages(project: &Project, paper_count: u32, max_branches: u32) -> Vec<Value> {
	let user = format!(
		"Project summary:\n{}\n\nProject description:\n{}\n\nConstraints:\n{}\n\nPropose {paper_count} \
		 relevant papers spread across at most {max_branches} approach tags.",
		project.summary,
		project.description,
		render_map(&project.constraints),
	);

	vec![message("system", PAPERS_SYSTEM), message("user", user)]
}

pub(crate) fn chat_messages(packet: &ContextPacket, recent: &[ChatMessage], question: &str) -> Vec<Value> {
	let context = json!({
		"project_summary": packet.project_summary,
		"constraints": packet.constraints,
		"selected_papers": packet
			.selected_papers
			.iter()
			.map(|paper| json!({
				"paperId": paper.paper.paper_id,
				"title": paper.paper.title,
				"year": paper.paper.year,
				"approach": paper.paper.approach,
				"abstract": paper.paper.r#abstract,
			}))
			.collect::<Vec<_>>(),
		"evidence_cards": packet.evidence_cards,
		"linked_notes": packet
			.linked_notes
			.iter()
			.map(|note| json!({ "id": note.id, "content": note.content }))
			.collect::<Vec<_>>(),
	});
	let mut messages = vec![
		message("system", CHAT_SYSTEM),
		message("system", format!("Context:\n{context}")),
	];

	for turn in recent {
		let role = match turn.role {
			ChatRole::User => "user",
			ChatRole::Assistant => "assistant",
		};

		messages.push(message(role, turn.content.clone()));
	}

	messages.push(message("user", question));

	messages
}

pub(crate) fn evidence_messages(r#abstract: &str, max_items: u32) -> Vec<Value> {
	let user = format!("List at most {max_items} items per key.\n\nAbstract:\n{}", r#abstract);

	vec![message("system", EVIDENCE_SYSTEM), message("user", user)]
}

pub(crate) fn refine_messages(note: &Note, action: RefineAction, project_summary: &str) -> Vec<Value> {
	let instruction = match action {
		RefineAction::Clarify =>
			"Rewrite the note so it is clear and unambiguous. Keep every fact; add nothing new.",
		RefineAction::Summarize => "Summarize the note in two or three sentences.",
		RefineAction::NextSteps =>
			"Propose up to five concrete next steps that follow from the note, as a bullet list.",
	};
	let user = format!(
		"Project summary:\n{project_summary}\n\nNote:\n{}\n\n{instruction} Reply with the result only.",
		note.content
	);

	vec![message("system", "You help researchers refine their working notes."), message("user", user)]
}
