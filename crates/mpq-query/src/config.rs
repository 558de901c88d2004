// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client configuration.
//!
//! A [`QueryConfig`] carries the two required credentials plus optional
//! overrides. It can be built directly or loaded from the environment:
//!
//! | variable | meaning |
//! |---|---|
//! | `MIXPANEL_API_KEY` | project API key (required) |
//! | `MIXPANEL_API_SECRET` | project API secret (required unless `_FILE` is set) |
//! | `MIXPANEL_API_SECRET_FILE` | path to a file holding the secret |
//! | `MIXPANEL_AUTH` | `signature` (default) or `secret` |
//! | `MIXPANEL_BASE_URL` | query API base, default `https://mixpanel.com/api` |
//! | `MIXPANEL_DATA_BASE_URL` | raw export base, default `https://data.mixpanel.com/api` |
//! | `MIXPANEL_TIMEOUT_SECS` | request timeout in seconds, default 120 |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use mpq_common_secret::SecretString;
use url::Url;

use crate::auth::{AuthKind, Credentials};

pub const DEFAULT_BASE_URL: &str = "https://mixpanel.com/api";
pub const DEFAULT_DATA_BASE_URL: &str = "https://data.mixpanel.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENV_API_KEY: &str = "MIXPANEL_API_KEY";
pub const ENV_API_SECRET: &str = "MIXPANEL_API_SECRET";
pub const ENV_AUTH: &str = "MIXPANEL_AUTH";
pub const ENV_BASE_URL: &str = "MIXPANEL_BASE_URL";
pub const ENV_DATA_BASE_URL: &str = "MIXPANEL_DATA_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "MIXPANEL_TIMEOUT_SECS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A required environment variable was not set.
	#[error("missing environment variable: {0}")]
	MissingEnvVar(String),

	/// A configuration value was empty or invalid.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A `*_FILE` secret could not be read.
	#[error("failed to read secret file {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Settings for a [`crate::MixpanelQueryClient`].
#[derive(Debug, Clone)]
pub struct QueryConfig {
	pub api_key: String,
	pub api_secret: SecretString,
	pub auth: AuthKind,
	pub base_url: String,
	pub data_base_url: String,
	pub request_timeout: Duration,
}

impl QueryConfig {
	/// Creates a configuration with default endpoints, signature auth and a
	/// 120 second timeout.
	pub fn new(api_key: impl Into<String>, api_secret: impl Into<SecretString>) -> Self {
		Self {
			api_key: api_key.into(),
			api_secret: api_secret.into(),
			auth: AuthKind::default(),
			base_url: DEFAULT_BASE_URL.to_string(),
			data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
			request_timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Load configuration from `MIXPANEL_*` environment variables.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::MissingEnvVar`] if the key or secret is not set,
	/// and [`ConfigError::InvalidConfig`] for unparseable optional values.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Loads configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let api_key =
			lookup(ENV_API_KEY).ok_or_else(|| ConfigError::MissingEnvVar(ENV_API_KEY.to_string()))?;
		let api_secret = load_secret(&lookup, ENV_API_SECRET)?;

		let mut config = Self::new(api_key, api_secret);

		if let Some(auth) = lookup(ENV_AUTH) {
			config.auth = auth
				.parse()
				.map_err(|_| ConfigError::InvalidConfig(format!("{ENV_AUTH}={auth}")))?;
		}
		if let Some(base_url) = lookup(ENV_BASE_URL) {
			config.base_url = base_url;
		}
		if let Some(data_base_url) = lookup(ENV_DATA_BASE_URL) {
			config.data_base_url = data_base_url;
		}
		if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
			let secs: u64 = secs
				.parse()
				.map_err(|_| ConfigError::InvalidConfig(format!("{ENV_TIMEOUT_SECS}={secs}")))?;
			config.request_timeout = Duration::from_secs(secs);
		}

		Ok(config)
	}

	/// Validate that credentials are non-empty and URLs parse.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidConfig`] describing the first problem.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.api_key.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"api_key cannot be empty".to_string(),
			));
		}
		if self.api_secret.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"api_secret cannot be empty".to_string(),
			));
		}
		for (name, value) in [
			("base_url", &self.base_url),
			("data_base_url", &self.data_base_url),
		] {
			Url::parse(value)
				.map_err(|e| ConfigError::InvalidConfig(format!("{name} `{value}`: {e}")))?;
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::InvalidConfig(
				"request_timeout must be positive".to_string(),
			));
		}
		Ok(())
	}

	pub fn credentials(&self) -> Credentials {
		Credentials {
			api_key: self.api_key.clone(),
			api_secret: self.api_secret.clone(),
		}
	}
}

/// Reads `name`, or the contents of the file named by `{name}_FILE`.
///
/// The direct variable wins when both are set. Trailing newlines in the
/// file are stripped.
pub fn load_secret<F>(lookup: &F, name: &str) -> Result<SecretString, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(value) = lookup(name) {
		return Ok(SecretString::new(value));
	}

	let file_var = format!("{name}_FILE");
	let path = lookup(&file_var)
		.map(PathBuf::from)
		.ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

	let contents =
		std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile { path, source })?;

	Ok(SecretString::new(
		contents.trim_end_matches(['\n', '\r']).to_string(),
	))
}
