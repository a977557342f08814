use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub research: Research,
	#[serde(default)]
	pub evidence: Evidence,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// One of "memory" or "postgres".
	pub backend: String,
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	/// Required when `research.strategy` is "centroid".
	pub embedding: Option<EmbeddingProviderConfig>,
	pub literature: Option<LiteratureProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteratureProviderConfig {
	pub api_base: String,
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	/// Minimum spacing between two outbound search requests.
	#[serde(default = "default_min_interval_ms")]
	pub min_interval_ms: u64,
	#[serde(default = "default_cache_ttl_secs")]
	pub cache_ttl_secs: u64,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Research {
	/// One of "label" or "centroid".
	pub strategy: String,
	pub paper_count: u32,
	pub max_branches: u32,
	#[serde(default = "default_max_iterations")]
	pub max_iterations: u32,
	/// Fixes centroid initialization. Leave unset outside of tests and demos.
	pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Evidence {
	pub max_items_per_field: u32,
	pub max_item_chars: u32,
}
impl Default for Evidence {
	fn default() -> Self {
		Self { max_items_per_field: 5, max_item_chars: 240 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_min_interval_ms() -> u64 {
	1_000
}

fn default_cache_ttl_secs() -> u64 {
	3_600
}

fn default_max_retries() -> u32 {
	3
}

fn default_max_iterations() -> u32 {
	20
}
