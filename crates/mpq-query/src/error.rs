// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Mixpanel query client.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur when querying the Mixpanel Data Export API.
#[derive(Debug, Error)]
pub enum QueryError {
	/// The `unit` argument is not one of the supported time units.
	#[error("invalid unit `{0}`: must be one of minute, hour, day, week, month")]
	InvalidUnit(String),

	/// The response format is not one of the supported formats.
	#[error("invalid response format `{0}`: must be one of json, csv")]
	InvalidFormat(String),

	/// The event type is not one of the supported analysis types.
	#[error("invalid event type `{0}`: must be one of general, unique, average")]
	InvalidEventType(String),

	/// The list of event names was empty.
	#[error("at least one event name is required")]
	EmptyEventNames,

	/// A count-like argument was zero.
	#[error("`{name}` must be a positive integer")]
	InvalidInterval { name: &'static str },

	/// `from_date` is after `to_date`.
	#[error("invalid date range: {from} is after {to}")]
	InvalidDateRange { from: NaiveDate, to: NaiveDate },

	/// Any other argument that failed validation.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// Network-level error during HTTP communication.
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("request timed out")]
	Timeout,

	/// The API key or secret was rejected.
	#[error("invalid API key or secret")]
	Unauthorized,

	/// The signed request reached Mixpanel after its `expire` timestamp.
	#[error("request expired before it reached Mixpanel")]
	ExpiredRequest,

	/// Rate limit exceeded.
	#[error("rate limit exceeded")]
	RateLimited,

	/// Mixpanel returned a non-success status.
	#[error("Mixpanel API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// The response body could not be decoded.
	#[error("invalid response from Mixpanel: {0}")]
	InvalidResponse(String),
}

impl QueryError {
	/// Returns `true` for errors raised by argument validation, before any
	/// request was sent.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			QueryError::InvalidUnit(_)
				| QueryError::InvalidFormat(_)
				| QueryError::InvalidEventType(_)
				| QueryError::EmptyEventNames
				| QueryError::InvalidInterval { .. }
				| QueryError::InvalidDateRange { .. }
				| QueryError::InvalidArgument(_)
		)
	}
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validation_errors_are_flagged() {
		let errors = [
			QueryError::InvalidUnit("decade".to_string()),
			QueryError::InvalidFormat("xml".to_string()),
			QueryError::InvalidEventType("median".to_string()),
			QueryError::EmptyEventNames,
			QueryError::InvalidInterval { name: "interval" },
			QueryError::InvalidArgument("limit".to_string()),
		];
		for err in errors {
			assert!(err.is_validation(), "{err} should be a validation error");
		}
	}

	#[test]
	fn transport_errors_are_not_validation() {
		assert!(!QueryError::Timeout.is_validation());
		assert!(!QueryError::Unauthorized.is_validation());
		assert!(!QueryError::RateLimited.is_validation());
		assert!(!QueryError::ApiError {
			status: 500,
			message: "boom".to_string()
		}
		.is_validation());
	}

	#[test]
	fn invalid_unit_message_names_the_value() {
		let err = QueryError::InvalidUnit("decade".to_string());
		assert!(err.to_string().contains("decade"));
	}
}
