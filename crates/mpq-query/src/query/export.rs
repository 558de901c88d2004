// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Raw event export.

use chrono::NaiveDate;

use super::{collect_names, require_date_range, require_positive_opt, ApiBase, Query};
use crate::error::Result;
use crate::params::Params;

/// Every raw event in a date range, one JSON object per line.
///
/// `GET https://data.mixpanel.com/api/2.0/export`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	/// Only export these events; all events when empty.
	pub events: Vec<String>,
	pub where_clause: Option<String>,
	pub limit: Option<u32>,
}

impl ExportQuery {
	pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
		Self {
			from_date,
			to_date,
			events: Vec::new(),
			where_clause: None,
			limit: None,
		}
	}

	pub fn events<I, S>(mut self, events: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.events = collect_names(events);
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

impl Query for ExportQuery {
	fn endpoint(&self) -> &'static str {
		"export"
	}

	fn base(&self) -> ApiBase {
		ApiBase::Data
	}

	fn to_params(&self) -> Result<Params> {
		require_date_range(self.from_date, self.to_date)?;
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new()
			.with("from_date", self.from_date)
			.with("to_date", self.to_date)
			.with("event", self.events.clone());
		params.insert_opt("where", self.where_clause.as_deref());
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}
