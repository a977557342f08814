mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Evidence, LiteratureProviderConfig, LlmProviderConfig,
	Postgres, Providers, Research, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	match cfg.storage.backend.as_str() {
		"memory" => {},
		"postgres" => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of memory or postgres.".to_string(),
			});
		},
	}

	let llm = &cfg.providers.llm;

	if llm.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider llm api_key must be non-empty.".to_string(),
		});
	}
	if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}

	if !matches!(cfg.research.strategy.as_str(), "label" | "centroid") {
		return Err(Error::Validation {
			message: "research.strategy must be one of label or centroid.".to_string(),
		});
	}
	if cfg.research.paper_count == 0 {
		return Err(Error::Validation {
			message: "research.paper_count must be greater than zero.".to_string(),
		});
	}
	if cfg.research.max_branches == 0 {
		return Err(Error::Validation {
			message: "research.max_branches must be greater than zero.".to_string(),
		});
	}
	if cfg.research.max_iterations == 0 {
		return Err(Error::Validation {
			message: "research.max_iterations must be greater than zero.".to_string(),
		});
	}
	if cfg.research.strategy == "centroid" {
		let Some(embedding) = cfg.providers.embedding.as_ref() else {
			return Err(Error::Validation {
				message: "providers.embedding is required when research.strategy is centroid."
					.to_string(),
			});
		};

		if embedding.dimensions == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.dimensions must be greater than zero.".to_string(),
			});
		}
		if embedding.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "Provider embedding api_key must be non-empty.".to_string(),
			});
		}
	}

	if cfg.evidence.max_items_per_field == 0 {
		return Err(Error::Validation {
			message: "evidence.max_items_per_field must be greater than zero.".to_string(),
		});
	}
	if cfg.evidence.max_item_chars == 0 {
		return Err(Error::Validation {
			message: "evidence.max_item_chars must be greater than zero.".to_string(),
		});
	}

	if let Some(literature) = cfg.providers.literature.as_ref() {
		if literature.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.literature.api_base must be non-empty.".to_string(),
			});
		}
		if literature.cache_ttl_secs == 0 {
			return Err(Error::Validation {
				message: "providers.literature.cache_ttl_secs must be greater than zero."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(literature) = cfg.providers.literature.as_mut()
		&& literature.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		literature.api_key = None;
	}

	cfg.research.strategy = cfg.research.strategy.trim().to_ascii_lowercase();
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();
}
