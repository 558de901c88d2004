// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Enumerated argument values accepted by the Data Export API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Granularity of time-bucketed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
	Minute,
	Hour,
	Day,
	Week,
	Month,
}

impl Unit {
	/// All supported units, in increasing order of size.
	pub const ALL: [Unit; 5] = [Unit::Minute, Unit::Hour, Unit::Day, Unit::Week, Unit::Month];

	/// Returns the wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			Unit::Minute => "minute",
			Unit::Hour => "hour",
			Unit::Day => "day",
			Unit::Week => "week",
			Unit::Month => "month",
		}
	}
}

impl fmt::Display for Unit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Unit {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"minute" => Ok(Unit::Minute),
			"hour" => Ok(Unit::Hour),
			"day" => Ok(Unit::Day),
			"week" => Ok(Unit::Week),
			"month" => Ok(Unit::Month),
			other => Err(QueryError::InvalidUnit(other.to_string())),
		}
	}
}

/// The kind of aggregate computed for event counts.
///
/// - `General`: total number of times the event fired
/// - `Unique`: number of distinct users who fired it
/// - `Average`: average firings per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
	General,
	Unique,
	Average,
}

impl EventType {
	/// Returns the wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			EventType::General => "general",
			EventType::Unique => "unique",
			EventType::Average => "average",
		}
	}
}

impl fmt::Display for EventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EventType {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"general" => Ok(EventType::General),
			"unique" => Ok(EventType::Unique),
			"average" => Ok(EventType::Average),
			other => Err(QueryError::InvalidEventType(other.to_string())),
		}
	}
}

/// Body format requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
	#[default]
	Json,
	Csv,
}

impl ResponseFormat {
	/// Returns the wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			ResponseFormat::Json => "json",
			ResponseFormat::Csv => "csv",
		}
	}
}

impl fmt::Display for ResponseFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResponseFormat {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"json" => Ok(ResponseFormat::Json),
			"csv" => Ok(ResponseFormat::Csv),
			other => Err(QueryError::InvalidFormat(other.to_string())),
		}
	}
}

/// How retention cohorts are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionType {
	/// First-time retention: cohorts are defined by a birth event.
	Birth,
	/// Recurring retention.
	Compounded,
}

impl RetentionType {
	/// Returns the wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			RetentionType::Birth => "birth",
			RetentionType::Compounded => "compounded",
		}
	}
}

impl fmt::Display for RetentionType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RetentionType {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"birth" => Ok(RetentionType::Birth),
			"compounded" => Ok(RetentionType::Compounded),
			other => Err(QueryError::InvalidArgument(format!(
				"retention type `{other}` must be one of birth, compounded"
			))),
		}
	}
}
