//! Configuration for the Safe transaction decoder.
//!
//! Configuration is TOML. `${VAR}` and `${VAR:-default}` references are
//! replaced with environment values before parsing, and a file can pull in
//! others with `include = ["chains.toml", "resolver.toml"]`. Every top-level
//! section must live in exactly one file.

mod loader;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound accepted for `service.max_concurrent_lookups`.
pub const MAX_CONCURRENT_LOOKUPS_LIMIT: usize = 256;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub service: ServiceConfig,
	/// Display names keyed by chain ID.
	#[serde(default, deserialize_with = "deserialize_chains")]
	pub chains: HashMap<u64, ChainConfig>,
	/// Address enrichment backends.
	pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Identifier of this decoder instance, used in logs.
	pub id: String,
	/// How many address lookups may be in flight at once while enriching.
	#[serde(default = "default_max_concurrent_lookups")]
	pub max_concurrent_lookups: usize,
}

fn default_max_concurrent_lookups() -> usize {
	16
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub name: String,
}

/// Configuration for address enrichment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
	/// Which implementation is used to enrich addresses.
	pub primary: String,
	/// Map of resolver implementation names to their raw configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Chain tables are keyed by the decimal chain ID, which TOML can only
/// express as a string key.
fn deserialize_chains<'de, D>(deserializer: D) -> Result<HashMap<u64, ChainConfig>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: HashMap<String, ChainConfig> = HashMap::deserialize(deserializer)?;
	raw.into_iter()
		.map(|(key, chain)| {
			key.parse::<u64>()
				.map(|id| (id, chain))
				.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))
		})
		.collect()
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values.
///
/// Inputs over 1MB are rejected before the regex runs.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from `path`, following `include` directives
	/// relative to the file's directory.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		let config = loader.load_config(file_name).await?;
		tracing::info!(
			service_id = %config.service.id,
			resolver = %config.resolver.primary,
			chains = config.chains.len(),
			"Loaded configuration"
		);
		Ok(config)
	}

	/// Display name of `chain_id`, if configured.
	pub fn chain_name(&self, chain_id: u64) -> Option<&str> {
		self.chains.get(&chain_id).map(|chain| chain.name.as_str())
	}

	/// Raw configuration of the primary resolver implementation.
	pub fn primary_resolver(&self) -> Option<(&str, &toml::Value)> {
		self.resolver
			.implementations
			.get_key_value(&self.resolver.primary)
			.map(|(name, value)| (name.as_str(), value))
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}
		if self.service.max_concurrent_lookups == 0
			|| self.service.max_concurrent_lookups > MAX_CONCURRENT_LOOKUPS_LIMIT
		{
			return Err(ConfigError::Validation(format!(
				"max_concurrent_lookups must be between 1 and {}, got {}",
				MAX_CONCURRENT_LOOKUPS_LIMIT, self.service.max_concurrent_lookups
			)));
		}

		for (chain_id, chain) in &self.chains {
			if chain.name.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Chain {} must have a non-empty name",
					chain_id
				)));
			}
		}

		if self.resolver.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one resolver implementation must be configured".into(),
			));
		}
		if self.resolver.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Resolver primary implementation cannot be empty".into(),
			));
		}
		if !self
			.resolver
			.implementations
			.contains_key(&self.resolver.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary resolver '{}' not found in implementations",
				self.resolver.primary
			)));
		}

		Ok(())
	}
}

/// Parses a TOML document, resolving environment references and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
