// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered CLI configuration.
//!
//! Values are resolved from, in increasing precedence:
//! - built-in defaults
//! - the TOML config file (`$XDG_CONFIG_HOME/mpq/config.toml`)
//! - `MIXPANEL_*` environment variables
//! - command-line flags

use std::path::{Path, PathBuf};

use mpq_query::config::{
	ENV_API_KEY, ENV_API_SECRET, ENV_AUTH, ENV_BASE_URL, ENV_DATA_BASE_URL, ENV_TIMEOUT_SECS,
};
use mpq_query::{AuthKind, QueryConfig};
use serde::Deserialize;

/// Log level used when neither `RUST_LOG`, the file nor a flag sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors that can occur while loading CLI configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading the config file
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Home directory not found
	#[error("Could not determine home directory")]
	HomeDirNotFound,

	#[error(transparent)]
	Query(#[from] mpq_query::ConfigError),
}

/// Contents of `config.toml`. Every field is optional.
///
/// ```toml
/// api_key = "0123456789abcdef"
/// api_secret_file = "/run/secrets/mixpanel"
/// auth = "secret"
/// timeout_secs = 60
/// log_level = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
	pub api_key: Option<String>,
	pub api_secret: Option<String>,
	pub api_secret_file: Option<PathBuf>,
	pub auth: Option<AuthKind>,
	pub base_url: Option<String>,
	pub data_base_url: Option<String>,
	pub timeout_secs: Option<u64>,
	pub log_level: Option<String>,
}

impl FileConfig {
	/// Reads `path`. A missing file yields an empty configuration.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let contents = match std::fs::read_to_string(path) {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
			Err(source) => {
				return Err(ConfigError::Io {
					path: path.to_path_buf(),
					source,
				})
			}
		};

		toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Looks a value up by its environment variable name.
	fn lookup(&self, name: &str) -> Option<String> {
		match name {
			ENV_API_KEY => self.api_key.clone(),
			ENV_API_SECRET => self.api_secret.clone(),
			ENV_AUTH => self.auth.map(|a| a.to_string()),
			ENV_BASE_URL => self.base_url.clone(),
			ENV_DATA_BASE_URL => self.data_base_url.clone(),
			ENV_TIMEOUT_SECS => self.timeout_secs.map(|s| s.to_string()),
			_ if name == secret_file_var() => self
				.api_secret_file
				.as_ref()
				.map(|p| p.display().to_string()),
			_ => None,
		}
	}
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub api_key: Option<String>,
	pub api_secret_file: Option<PathBuf>,
	pub auth: Option<AuthKind>,
	pub base_url: Option<String>,
	pub data_base_url: Option<String>,
	pub timeout_secs: Option<u64>,
}

impl CliOverrides {
	fn lookup(&self, name: &str) -> Option<String> {
		match name {
			ENV_API_KEY => self.api_key.clone(),
			ENV_AUTH => self.auth.map(|a| a.to_string()),
			ENV_BASE_URL => self.base_url.clone(),
			ENV_DATA_BASE_URL => self.data_base_url.clone(),
			ENV_TIMEOUT_SECS => self.timeout_secs.map(|s| s.to_string()),
			_ if name == secret_file_var() => self
				.api_secret_file
				.as_ref()
				.map(|p| p.display().to_string()),
			_ => None,
		}
	}
}

fn secret_file_var() -> String {
	format!("{ENV_API_SECRET}_FILE")
}

/// `$XDG_CONFIG_HOME/mpq/config.toml`, or `~/.config/mpq/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) => PathBuf::from(dir),
		None => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};
	Ok(config_home.join("mpq/config.toml"))
}

/// Merges flags, environment and file into a validated [`QueryConfig`].
///
/// The secret and the secret file are treated as one setting: the highest
/// layer that provides either one supplies it.
pub fn resolve<E>(
	overrides: &CliOverrides,
	env: E,
	file: &FileConfig,
) -> Result<QueryConfig, ConfigError>
where
	E: Fn(&str) -> Option<String>,
{
	let flags = |name: &str| overrides.lookup(name);
	let from_file = |name: &str| file.lookup(name);
	let layers: [&dyn Fn(&str) -> Option<String>; 3] = [&flags, &env, &from_file];
	let secret_file = secret_file_var();

	let lookup = |name: &str| {
		if name == ENV_API_SECRET || name == secret_file {
			let layer = layers
				.iter()
				.find(|layer| layer(ENV_API_SECRET).is_some() || layer(&secret_file).is_some())?;
			return layer(name);
		}
		layers.iter().find_map(|layer| layer(name))
	};

	let config = QueryConfig::from_lookup(lookup)?;
	config.validate()?;

	tracing::debug!(
		base_url = %config.base_url,
		auth = %config.auth,
		timeout_secs = config.request_timeout.as_secs(),
		"resolved configuration"
	);
	Ok(config)
}
