// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Funnel queries.

use chrono::NaiveDate;

use super::{require_date_range, require_positive_opt, Query};
use crate::error::{QueryError, Result};
use crate::params::Params;
use crate::types::Unit;

/// Conversion data for a saved funnel.
///
/// `GET /2.0/funnels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelQuery {
	pub funnel_id: u64,
	pub from_date: Option<NaiveDate>,
	pub to_date: Option<NaiveDate>,
	/// Days a user has to complete the funnel.
	pub length: Option<u32>,
	pub interval: Option<u32>,
	pub unit: Option<Unit>,
	/// Property expression to segment by.
	pub on: Option<String>,
	/// Expression filtering the events counted.
	pub where_clause: Option<String>,
	pub limit: Option<u32>,
}

impl FunnelQuery {
	pub fn new(funnel_id: u64) -> Self {
		Self {
			funnel_id,
			from_date: None,
			to_date: None,
			length: None,
			interval: None,
			unit: None,
			on: None,
			where_clause: None,
			limit: None,
		}
	}

	pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
		self.from_date = Some(from);
		self.to_date = Some(to);
		self
	}

	pub fn length(mut self, days: u32) -> Self {
		self.length = Some(days);
		self
	}

	pub fn interval(mut self, interval: u32) -> Self {
		self.interval = Some(interval);
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

	pub fn where_clause(mut self, expression: impl Into<String>) -> Self {
		self.where_clause = Some(expression.into());
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for FunnelQuery {
	fn endpoint(&self) -> &'static str {
		"funnels"
	}

	fn to_params(&self) -> Result<Params> {
		match (self.from_date, self.to_date) {
			(Some(from), Some(to)) => require_date_range(from, to)?,
			(None, None) => {}
			_ => {
				return Err(QueryError::InvalidArgument(
					"funnel `from_date` and `to_date` must be given together".to_string(),
				))
			}
		}
		require_positive_opt("length", self.length)?;
		require_positive_opt("interval", self.interval)?;
		require_positive_opt("limit", self.limit)?;

		let funnel_id = i64::try_from(self.funnel_id).map_err(|_| {
			QueryError::InvalidArgument(format!("funnel_id {} is out of range", self.funnel_id))
		})?;

		let mut params = Params::new().with("funnel_id", funnel_id);
		params.insert_opt("from_date", self.from_date);
		params.insert_opt("to_date", self.to_date);
		params.insert_opt("length", self.length);
		params.insert_opt("interval", self.interval);
		params.insert_opt("unit", self.unit);
		params.insert_opt("on", self.on.as_deref());
		params.insert_opt("where", self.where_clause.as_deref());
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}

/// Names and ids of every saved funnel.
///
/// `GET /2.0/funnels/list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunnelListQuery;

impl Query for FunnelListQuery {
	fn endpoint(&self) -> &'static str {
		"funnels/list"
	}

	fn to_params(&self) -> Result<Params> {
		Ok(Params::new())
	}
}
