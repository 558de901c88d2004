// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret wrapper type for API credentials.
//!
//! [`Secret<T>`] holds a sensitive value (an API secret, a basic-auth header)
//! and refuses to print it: `Debug`, `Display` and `Serialize` all emit
//! [`REDACTED`]. The inner value is zeroized on drop. Call
//! [`Secret::expose`] at the exact point the value goes on the wire.

use std::fmt;

use zeroize::Zeroize;

/// Placeholder emitted instead of a secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T: Zeroize> {
	inner: T,
}

/// The common case: a secret string.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	/// Wraps a sensitive value.
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Returns a reference to the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// Returns `true` if the wrapped string is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.inner.zeroize();
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
impl<T: Zeroize> serde::Serialize for Secret<T> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Secret<T>
where
	T: Zeroize + serde::Deserialize<'de>,
{
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		T::deserialize(deserializer).map(Secret::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		let debug = format!("{secret:?}");
		assert!(!debug.contains("hunter2"));
		assert!(debug.contains(REDACTED));
	}

	#[test]
	fn display_is_redacted() {
		let secret = SecretString::from("hunter2");
		assert_eq!(secret.to_string(), REDACTED);
	}

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::from("hunter2");
		assert_eq!(secret.expose(), "hunter2");
		assert!(!secret.is_empty());
		assert!(SecretString::from("").is_empty());
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserializes_from_plain_string_and_serializes_redacted() {
		let secret: SecretString = serde_json::from_str(r#""hunter2""#).unwrap();
		assert_eq!(secret.expose(), "hunter2");

		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[derive(Debug)]
	#[allow(dead_code)]
	struct Holder {
		key: String,
		secret: SecretString,
	}

	#[test]
	fn nested_debug_is_redacted() {
		let holder = Holder {
			key: "public".to_string(),
			secret: SecretString::from("super_secret_value"),
		};
		let debug = format!("{holder:?}");
		assert!(debug.contains("public"));
		assert!(!debug.contains("super_secret_value"));
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// Neither Debug nor Display ever leak the wrapped value.
		#[test]
		fn secret_never_formatted(value in "[a-zA-Z0-9]{8,40}") {
			prop_assume!(!REDACTED.contains(&value));
			prop_assume!(!"Secret".contains(&value));

			let secret = SecretString::new(value.clone());
			let debug = format!("{secret:?}");
			let display = secret.to_string();
			prop_assert!(!debug.contains(&value));
			prop_assert!(!display.contains(&value));
			prop_assert_eq!(secret.expose(), &value);
		}
	}
}
