pub mod chat;
pub mod evidence;
pub mod literature;
pub mod notes;
pub mod projects;
pub mod research;

mod error;
mod prompts;

pub use chat::{ChatRequest, ChatResponse, ContextCounts};
pub use error::{Error, Result};
pub use evidence::ExtractEvidenceRequest;
pub use litmap_storage::BoxFuture;
pub use notes::{
	CreateNoteRequest, NoteView, RefineAction, RefineRequest, RefineResponse, ResolvedSource,
	UpdateNoteRequest,
};
pub use projects::{CreateProjectRequest, UpdateProjectRequest};

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;
use time::OffsetDateTime;

use litmap_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use litmap_domain::{
	paper::Paper,
	ranking::{BranchRanker, SyntheticDecay},
};
use litmap_providers::{embedding, generator, literature::LiteratureClient};
use litmap_storage::KvStore;

pub trait GeneratorProvider
where
	Self: Send + Sync,
{
	fn generate_json<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;

	fn generate_text<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait LiteratureProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Paper>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub generator: Arc<dyn GeneratorProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
	/// Absent when `providers.literature` is not configured.
	pub literature: Option<Arc<dyn LiteratureProvider>>,
}
impl Providers {
	pub fn new(
		generator: Arc<dyn GeneratorProvider>,
		embedding: Arc<dyn EmbeddingProvider>,
		literature: Option<Arc<dyn LiteratureProvider>>,
	) -> Self {
		Self { generator, embedding, literature }
	}

	/// HTTP-backed providers, with a literature client when one is configured.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let mut providers = Self::default();

		if let Some(literature) = cfg.providers.literature.clone() {
			let client = LiteratureClient::new(literature)?;

			providers.literature = Some(Arc::new(client));
		}

		Ok(providers)
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { generator: provider.clone(), embedding: provider, literature: None }
	}
}

pub struct LitmapService {
	pub cfg: Config,
	pub store: Arc<dyn KvStore>,
	pub providers: Providers,
	pub ranker: Arc<dyn BranchRanker>,
	chat_locks: KeyedLocks,
}
impl LitmapService {
	pub fn new(cfg: Config, store: Arc<dyn KvStore>) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self::with_providers(cfg, store, providers))
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn KvStore>, providers: Providers) -> Self {
		Self {
			cfg,
			store,
			providers,
			ranker: Arc::new(SyntheticDecay::default()),
			chat_locks: KeyedLocks::default(),
		}
	}

	pub fn with_ranker(mut self, ranker: Arc<dyn BranchRanker>) -> Self {
		self.ranker = ranker;

		self
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	pub(crate) fn rng(&self) -> StdRng {
		match self.cfg.research.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}

	/// Serializes read-modify-write cycles on one project's chat history.
	///
	/// Hand the lock back with [`Self::release_chat_lock`] once the guard is dropped.
	pub(crate) fn chat_lock(&self, project_id: &str) -> Arc<tokio::sync::Mutex<()>> {
		self.chat_locks.acquire(project_id)
	}

	pub(crate) fn release_chat_lock(&self, project_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
		self.chat_locks.release(project_id, lock);
	}
}

/// Async locks keyed by id. An entry lives only while some caller holds its lock.
#[derive(Default)]
struct KeyedLocks {
	locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}
impl KeyedLocks {
	fn acquire(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
		let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());

		locks.entry(key.to_string()).or_default().clone()
	}

	fn release(&self, key: &str, lock: Arc<tokio::sync::Mutex<()>>) {
		let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());

		drop(lock);

		if locks.get(key).is_some_and(|held| Arc::strong_count(held) == 1) {
			locks.remove(key);
		}
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.locks.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}

struct DefaultProviders;
impl GeneratorProvider for DefaultProviders {
	fn generate_json<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(generator::generate_json(cfg, messages))
	}

	fn generate_text<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(generator::generate_text(cfg, messages))
	}
}
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl LiteratureProvider for LiteratureClient {
	fn search<'a>(
		&'a self,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Paper>>> {
		Box::pin(LiteratureClient::search(self, query, limit))
	}
}
