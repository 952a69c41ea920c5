mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Graph, Postgres, Profile, Search, Service, Storage, Translation};

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
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("graph.url", &cfg.graph.url),
		("graph.database", &cfg.graph.database),
		("graph.username", &cfg.graph.username),
		("graph.password", &cfg.graph.password),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !cfg.graph.url.starts_with("http://") && !cfg.graph.url.starts_with("https://") {
		return Err(Error::Validation {
			message: "graph.url must be an http:// or https:// URL.".to_string(),
		});
	}
	if cfg.graph.max_attempts == 0 {
		return Err(Error::Validation {
			message: "graph.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.graph.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "graph.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.home_page_size == 0 {
		return Err(Error::Validation {
			message: "search.home_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.profile.max_preferences == 0 {
		return Err(Error::Validation {
			message: "profile.max_preferences must be greater than zero.".to_string(),
		});
	}

	for (word, translated) in &cfg.translation.dictionary {
		if word.is_empty() || word.split_whitespace().count() != 1 {
			return Err(Error::Validation {
				message: format!("translation.dictionary key {word:?} must be a single word."),
			});
		}
		if translated.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("translation.dictionary value for {word:?} must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.graph.url = cfg.graph.url.trim().trim_end_matches('/').to_string();
	cfg.graph.constraints.retain(|statement| !statement.trim().is_empty());

	// Lookups are made with case-folded words.
	cfg.translation.dictionary = std::mem::take(&mut cfg.translation.dictionary)
		.into_iter()
		.map(|(word, translated)| (word.trim().to_lowercase(), translated.trim().to_string()))
		.collect();
}
