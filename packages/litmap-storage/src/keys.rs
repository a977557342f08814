pub const PROJECT_PREFIX: &str = "project_";
pub const RESEARCH_PREFIX: &str = "research_";
pub const NOTE_PREFIX: &str = "note_";
pub const CHAT_PREFIX: &str = "chat_";

pub fn project_key(project_id: &str) -> String {
	format!("{PROJECT_PREFIX}{project_id}")
}

pub fn research_key(project_id: &str) -> String {
	format!("{RESEARCH_PREFIX}{project_id}")
}

pub fn note_key(note_id: &str) -> String {
	format!("{NOTE_PREFIX}{note_id}")
}

pub fn chat_key(project_id: &str) -> String {
	format!("{CHAT_PREFIX}{project_id}")
}
