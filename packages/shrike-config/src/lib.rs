mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Dedup, EmbeddingProviderConfig, GeocoderConfig, LlmProviderConfig, Postgres,
	Providers, Qdrant, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.dedup.sim_threshold) {
		return Err(Error::Validation {
			message: "dedup.sim_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.dedup.candidate_k == 0 {
		return Err(Error::Validation {
			message: "dedup.candidate_k must be greater than zero.".to_string(),
		});
	}
	if cfg.dedup.time_window_minutes <= 0 {
		return Err(Error::Validation {
			message: "dedup.time_window_minutes must be greater than zero.".to_string(),
		});
	}
	if !cfg.dedup.geo_radius_km.is_finite() || cfg.dedup.geo_radius_km <= 0.0 {
		return Err(Error::Validation {
			message: "dedup.geo_radius_km must be a positive finite number.".to_string(),
		});
	}
	if cfg.providers.geocoder.max_bbox_degrees <= 0.0 {
		return Err(Error::Validation {
			message: "providers.geocoder.max_bbox_degrees must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.geocoder.nominatim_url.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.geocoder.nominatim_url must be non-empty.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("classifier", &cfg.providers.classifier.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}
