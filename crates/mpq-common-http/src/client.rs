// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
pub fn platform() -> String {
	format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Creates a new HTTP client builder with the standard mpq User-Agent header.
///
/// Callers customise it further (timeouts, proxies) and call `build()`.
///
/// # Example
/// ```ignore
/// let client = mpq_common_http::builder()
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns the standard mpq User-Agent string.
///
/// Format: `mpq/{version} ({platform})`
pub fn user_agent() -> String {
	format!("mpq/{} ({})", VERSION, platform())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		assert!(ua.starts_with("mpq/"));
		assert!(ua.contains(VERSION));
		assert!(ua.ends_with(&format!("({})", platform())));
	}

	#[test]
	fn platform_format_is_valid() {
		let platform = platform();
		assert!(platform.contains('-'));
		assert!(!platform.starts_with('-'));
	}

	#[test]
	fn builder_produces_client() {
		assert!(builder().build().is_ok());
	}
}
