// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cohort retention queries.

use chrono::NaiveDate;

use super::{require_date_range, require_positive_opt, Query};
use crate::error::{QueryError, Result};
use crate::params::Params;
use crate::types::{RetentionType, Unit};

/// Cohort analysis over a date range.
///
/// `GET /2.0/retention`
///
/// Birth retention (the default) needs a `born_event` defining the cohort;
/// compounded retention does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionQuery {
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	pub retention_type: Option<RetentionType>,
	pub born_event: Option<String>,
	/// The event that counts as "came back"; any event when unset.
	pub event: Option<String>,
	pub born_where: Option<String>,
	pub where_clause: Option<String>,
	/// Bucket size in days. Mutually exclusive with `unit`.
	pub interval: Option<u32>,
	pub interval_count: Option<u32>,
	pub unit: Option<Unit>,
	pub on: Option<String>,
	pub limit: Option<u32>,
}

impl RetentionQuery {
	pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
		Self {
			from_date,
			to_date,
			retention_type: None,
			born_event: None,
			event: None,
			born_where: None,
			where_clause: None,
			interval: None,
			interval_count: None,
			unit: None,
			on: None,
			limit: None,
		}
	}

	/// First-time retention for users who fired `born_event`.
	pub fn birth(from_date: NaiveDate, to_date: NaiveDate, born_event: impl Into<String>) -> Self {
		let mut query = Self::new(from_date, to_date);
		query.retention_type = Some(RetentionType::Birth);
		query.born_event = Some(born_event.into());
		query
	}

	/// Recurring retention.
	pub fn compounded(from_date: NaiveDate, to_date: NaiveDate) -> Self {
		let mut query = Self::new(from_date, to_date);
		query.retention_type = Some(RetentionType::Compounded);
		query
	}

	pub fn event(mut self, event: impl Into<String>) -> Self {
		self.event = Some(event.into());
		self
	}

	pub fn born_where(mut self, expression: impl Into<String>) -> Self {
		self.born_where = Some(expression.into());
		self
	}

	pub fn where_clause(mut self, expression: impl Into<String>) -> Self {
		self.where_clause = Some(expression.into());
		self
	}

	pub fn interval(mut self, days: u32) -> Self {
		self.interval = Some(days);
		self
	}

	pub fn interval_count(mut self, count: u32) -> Self {
		self.interval_count = Some(count);
		self
	}

	pub fn unit(mut self, unit: Unit) -> Self {
		self.unit = Some(unit);
		self
	}

	pub fn on(mut self, expression: impl Into<String>) -> Self {
		self.on = Some(expression.into());
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for RetentionQuery {
	fn endpoint(&self) -> &'static str {
		"retention"
	}

	fn to_params(&self) -> Result<Params> {
		require_date_range(self.from_date, self.to_date)?;
		require_positive_opt("interval", self.interval)?;
		require_positive_opt("interval_count", self.interval_count)?;
		require_positive_opt("limit", self.limit)?;

		let born_event = self.born_event.as_deref().filter(|e| !e.is_empty());
		let is_birth = self.retention_type != Some(RetentionType::Compounded);
		if is_birth && born_event.is_none() {
			return Err(QueryError::InvalidArgument(
				"`born_event` is required for birth retention".to_string(),
			));
		}

		if let Some(unit) = self.unit {
			if matches!(unit, Unit::Minute | Unit::Hour) {
				return Err(QueryError::InvalidUnit(unit.to_string()));
			}
			if self.interval.is_some() {
				return Err(QueryError::InvalidArgument(
					"retention takes either `interval` or `unit`, not both".to_string(),
				));
			}
		}

		let mut params = Params::new()
			.with("from_date", self.from_date)
			.with("to_date", self.to_date);
		params.insert_opt("retention_type", self.retention_type);
		params.insert_opt("born_event", born_event);
		params.insert_opt("event", self.event.as_deref());
		params.insert_opt("born_where", self.born_where.as_deref());
		params.insert_opt("where", self.where_clause.as_deref());
		params.insert_opt("interval", self.interval);
		params.insert_opt("interval_count", self.interval_count);
		params.insert_opt("unit", self.unit);
		params.insert_opt("on", self.on.as_deref());
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}
