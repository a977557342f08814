use crate::{Error, LitmapService, Result};
use litmap_domain::paper::Paper;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

impl LitmapService {
	pub async fn search_literature(&self, query: &str, limit: Option<u32>) -> Result<Vec<Paper>> {
		let Some(literature) = self.providers.literature.as_ref() else {
			return Err(Error::InvalidRequest {
				message: "Literature search is not configured.".to_string(),
			});
		};

		if query.trim().is_empty() {
			return Err(Error::MissingFields { fields: vec!["query".to_string()] });
		}

		let papers = literature.search(query.trim(), limit.unwrap_or(DEFAULT_SEARCH_LIMIT)).await?;

		tracing::info!(results = papers.len(), "Literature search answered.");

		Ok(papers)
	}
}
