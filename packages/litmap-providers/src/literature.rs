use std::{sync::Arc, time::Duration};

use color_eyre::{Result, eyre};
use reqwest::{Client, StatusCode, header::HeaderMap};
use serde::Deserialize;
use tokio::{sync::Mutex, time::Instant};

use crate::cache::{Clock, SystemClock, TtlCache};
use litmap_config::LiteratureProviderConfig;
use litmap_domain::paper::{Author, Paper};

const SEARCH_PATH: &str = "/paper/search";
const SEARCH_FIELDS: &str = "title,authors,year,abstract,venue,citationCount";
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Paper search against a Semantic Scholar compatible API.
///
/// Outbound requests are spaced by `min_interval_ms`, retried on 429 and 5xx, and successful
/// results are cached per `(query, limit)` for `cache_ttl_secs`.
pub struct LiteratureClient {
	cfg: LiteratureProviderConfig,
	http: Client,
	cache: TtlCache<String, Vec<Paper>>,
	last_request: Mutex<Option<Instant>>,
}
impl LiteratureClient {
	pub fn new(cfg: LiteratureProviderConfig) -> Result<Self> {
		Self::with_clock(cfg, Arc::new(SystemClock))
	}

	pub fn with_clock(cfg: LiteratureProviderConfig, clock: Arc<dyn Clock>) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let max_age = time::Duration::seconds(i64::try_from(cfg.cache_ttl_secs)?);

		Ok(Self { cfg, http, cache: TtlCache::new(max_age, clock), last_request: Mutex::new(None) })
	}

	pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>> {
		let query = query.trim();

		if query.is_empty() {
			return Err(eyre::eyre!("Search query must be non-empty."));
		}

		let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
		let key = cache_key(query, limit);

		if let Some(papers) = self.cache.get(&key) {
			tracing::debug!(query, limit, "Literature search served from cache.");

			return Ok(papers);
		}

		let papers = self.fetch(query, limit).await?;

		self.cache.insert(key, papers.clone());

		Ok(papers)
	}

	async fn fetch(&self, query: &str, limit: u32) -> Result<Vec<Paper>> {
		let url = format!("{}{}", self.cfg.api_base.trim_end_matches('/'), SEARCH_PATH);
		let headers = self.headers()?;
		let limit_param = limit.to_string();
		let mut attempt = 0;

		loop {
			self.wait_for_slot().await;

			let res = self
				.http
				.get(&url)
				.headers(headers.clone())
				.query(&[("query", query), ("limit", limit_param.as_str()), ("fields", SEARCH_FIELDS)])
				.send()
				.await?;
			let status = res.status();

			if is_retryable(status) && attempt < self.cfg.max_retries {
				let delay = RETRY_BASE_DELAY * 2_u32.saturating_pow(attempt);

				tracing::warn!(%status, attempt, ?delay, "Literature search throttled or failed; retrying.");
				tokio::time::sleep(delay).await;

				attempt += 1;

				continue;
			}

			let body: SearchResponse = res.error_for_status()?.json().await?;

			return Ok(body.data.into_iter().filter_map(SearchPaper::into_paper).collect());
		}
	}

	fn headers(&self) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();

		if let Some(api_key) = self.cfg.api_key.as_deref() {
			headers.insert("x-api-key", api_key.parse()?);
		}

		Ok(headers)
	}

	async fn wait_for_slot(&self) {
		let min_interval = Duration::from_millis(self.cfg.min_interval_ms);
		let mut last = self.last_request.lock().await;

		if let Some(previous) = *last {
			let ready_at = previous + min_interval;

			if ready_at > Instant::now() {
				tokio::time::sleep_until(ready_at).await;
			}
		}

		*last = Some(Instant::now());
	}
}

#[derive(Deserialize)]
struct SearchResponse {
	#[serde(default)]
	data: Vec<SearchPaper>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPaper {
	paper_id: Option<String>,
	title: Option<String>,
	#[serde(default)]
	authors: Vec<SearchAuthor>,
	year: Option<i32>,
	r#abstract: Option<String>,
	venue: Option<String>,
	citation_count: Option<u64>,
}
impl SearchPaper {
	fn into_paper(self) -> Option<Paper> {
		let paper_id = self.paper_id.filter(|id| !id.trim().is_empty())?;

		Some(Paper {
			paper_id,
			title: self.title.unwrap_or_default(),
			authors: self
				.authors
				.into_iter()
				.filter_map(|author| author.name)
				.map(|name| Author { name })
				.collect(),
			year: self.year,
			r#abstract: self.r#abstract.unwrap_or_default(),
			venue: self.venue.unwrap_or_default(),
			citation_count: self.citation_count.unwrap_or_default(),
			approach: String::new(),
		})
	}
}

#[derive(Deserialize)]
struct SearchAuthor {
	name: Option<String>,
}

fn cache_key(query: &str, limit: u32) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(query.to_lowercase().as_bytes());
	hasher.update(&limit.to_le_bytes());

	hasher.finalize().to_hex().to_string()
}

fn is_retryable(status: StatusCode) -> bool {
	status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
