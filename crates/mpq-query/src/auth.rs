// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request authentication strategies.
//!
//! Mixpanel accepts two ways of proving a request comes from the project
//! owner:
//!
//! - **Signature auth** ([`SignatureAuth`]): the request carries `api_key`,
//!   an `expire` timestamp and `sig`, the MD5 hex digest of every parameter
//!   as sorted `key=value` pairs followed by the API secret. The secret itself
//!   never leaves the process.
//! - **Secret auth** ([`SecretAuth`]): the request carries `api_key` and an
//!   HTTP basic `Authorization` header whose username is the API secret and
//!   whose password is empty.
//!
//! Both implement [`AuthStrategy`], so the client holds either behind an
//! `Box<dyn AuthStrategy>`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use mpq_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::params::Params;

/// Signed requests are valid for ten minutes.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(600);

/// Project credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
	pub api_key: String,
	pub api_secret: SecretString,
}

impl Credentials {
	pub fn new(api_key: impl Into<String>, api_secret: impl Into<SecretString>) -> Self {
		Self {
			api_key: api_key.into(),
			api_secret: api_secret.into(),
		}
	}
}

/// Parameters and headers ready to be sent.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
	/// Final query-string parameters.
	pub params: Params,
	/// Value for the `Authorization` header, if the strategy uses one.
	pub authorization: Option<SecretString>,
}

/// Selects one of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
	#[default]
	Signature,
	Secret,
}

impl AuthKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuthKind::Signature => "signature",
			AuthKind::Secret => "secret",
		}
	}

	/// Builds the strategy with its default settings.
	pub fn strategy(&self) -> Box<dyn AuthStrategy> {
		match self {
			AuthKind::Signature => Box::new(SignatureAuth::default()),
			AuthKind::Secret => Box::new(SecretAuth),
		}
	}
}

impl fmt::Display for AuthKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for AuthKind {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"signature" => Ok(AuthKind::Signature),
			"secret" => Ok(AuthKind::Secret),
			other => Err(QueryError::InvalidArgument(format!(
				"auth strategy `{other}` must be one of signature, secret"
			))),
		}
	}
}

/// Turns a parameter mapping into an authenticated request.
///
/// Implementations do not validate parameters; anything malformed is left
/// for Mixpanel to reject.
pub trait AuthStrategy: fmt::Debug + Send + Sync {
	fn kind(&self) -> AuthKind;

	fn authenticate(&self, credentials: &Credentials, params: Params) -> AuthenticatedRequest;
}

/// Computes the request signature: MD5 over the sorted `key=value`
/// concatenation of `params` followed by `secret`, as lowercase hex.
pub fn signature(params: &Params, secret: &str) -> String {
	let mut hasher = Md5::new();
	hasher.update(params.signing_string().as_bytes());
	hasher.update(secret.as_bytes());
	hex::encode(hasher.finalize())
}

/// MD5 signature authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureAuth {
	expiration: Duration,
}

impl Default for SignatureAuth {
	fn default() -> Self {
		Self {
			expiration: DEFAULT_EXPIRATION,
		}
	}
}

impl SignatureAuth {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets how long a signed request stays valid.
	pub fn with_expiration(mut self, expiration: Duration) -> Self {
		self.expiration = expiration;
		self
	}

	pub fn expiration(&self) -> Duration {
		self.expiration
	}

	/// Signs `params` as if the current time were `now`.
	pub fn authenticate_at(
		&self,
		credentials: &Credentials,
		mut params: Params,
		now: DateTime<Utc>,
	) -> AuthenticatedRequest {
		let expire = now.timestamp() + self.expiration.as_secs() as i64;

		params.insert("api_key", credentials.api_key.as_str());
		params.insert("expire", expire);
		params.remove("sig");

		let sig = signature(&params, credentials.api_secret.expose());
		params.insert("sig", sig);

		AuthenticatedRequest {
			params,
			authorization: None,
		}
	}
}

impl AuthStrategy for SignatureAuth {
	fn kind(&self) -> AuthKind {
		AuthKind::Signature
	}

	fn authenticate(&self, credentials: &Credentials, params: Params) -> AuthenticatedRequest {
		self.authenticate_at(credentials, params, Utc::now())
	}
}

/// Basic-auth secret authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecretAuth;

impl SecretAuth {
	/// Returns the `Authorization` header value for `secret`.
	pub fn authorization_header(secret: &str) -> SecretString {
		let encoded = STANDARD.encode(format!("{secret}:"));
		SecretString::new(format!("Basic {encoded}"))
	}
}

impl AuthStrategy for SecretAuth {
	fn kind(&self) -> AuthKind {
		AuthKind::Secret
	}

	fn authenticate(&self, credentials: &Credentials, mut params: Params) -> AuthenticatedRequest {
		params.insert("api_key", credentials.api_key.as_str());

		AuthenticatedRequest {
			params,
			authorization: Some(Self::authorization_header(
				credentials.api_secret.expose(),
			)),
		}
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// The same parameters and secret always give the same signature.
		#[test]
		fn signature_is_deterministic(
			pairs in proptest::collection::vec(("[a-z_]{1,12}", "[ -~]{0,20}"), 0..8),
			secret in "[a-f0-9]{32}",
		) {
			let params: Params = pairs.into_iter().collect();
			prop_assert_eq!(signature(&params, &secret), signature(&params.clone(), &secret));
		}

		/// Insertion order never changes the signature.
		#[test]
		fn signature_ignores_insertion_order(
			pairs in proptest::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,20}", 0..8),
			secret in "[a-f0-9]{32}",
		) {
			let forward: Params = pairs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
			let reverse: Params = pairs.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect();
			prop_assert_eq!(signature(&forward, &secret), signature(&reverse, &secret));
		}

		/// Different secrets give different signatures for the same parameters.
		#[test]
		fn signature_depends_on_secret(
			a in "[a-f0-9]{32}",
			b in "[a-f0-9]{32}",
		) {
			prop_assume!(a != b);
			let params = Params::new().with("event", "signup");
			prop_assert_ne!(signature(&params, &a), signature(&params, &b));
		}
	}
}
