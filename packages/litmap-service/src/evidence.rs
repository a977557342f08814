use serde::Deserialize;

use crate::{Error, LitmapService, Result, prompts};
use litmap_domain::evidence::{EvidenceLimits, EvidenceRecord};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractEvidenceRequest {
	#[serde(rename = "abstract")]
	pub r#abstract: Option<String>,
}

impl LitmapService {
	/// Extracts a four-field evidence record from an abstract.
	///
	/// Output that does not match the record shape fails the whole extraction.
	pub async fn extract_evidence(&self, req: ExtractEvidenceRequest) -> Result<EvidenceRecord> {
		Error::require(&[("abstract", req.r#abstract.as_deref())])?;

		let text = req.r#abstract.unwrap_or_default();
		let limits = EvidenceLimits {
			max_items_per_field: self.cfg.evidence.max_items_per_field as usize,
			max_item_chars: self.cfg.evidence.max_item_chars as usize,
		};
		let messages = prompts::evidence_messages(text.trim(), self.cfg.evidence.max_items_per_field);
		let generated =
			self.providers.generator.generate_json(&self.cfg.providers.llm, &messages).await?;

		Ok(EvidenceRecord::from_generated(&generated, &limits)?)
	}
}
