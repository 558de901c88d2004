// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Segmentation queries.

use chrono::NaiveDate;

use super::{require_date_range, require_non_empty, require_positive_opt, Query};
use crate::error::{QueryError, Result};
use crate::params::Params;
use crate::types::{EventType, Unit};

/// Which segmentation report to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationKind {
	/// Event counts segmented by a property.
	#[default]
	Plain,
	/// Counts bucketed by a numeric `on` expression.
	Numeric { buckets: Option<u32> },
	/// Sum of a numeric `on` expression per unit.
	Sum,
	/// Average of a numeric `on` expression per unit.
	Average,
}

impl SegmentationKind {
	fn endpoint(&self) -> &'static str {
		match self {
			SegmentationKind::Plain => "segmentation",
			SegmentationKind::Numeric { .. } => "segmentation/numeric",
			SegmentationKind::Sum => "segmentation/sum",
			SegmentationKind::Average => "segmentation/average",
		}
	}
}

/// Event data segmented and filtered by properties.
///
/// `GET /2.0/segmentation[/numeric|/sum|/average]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationQuery {
	pub kind: SegmentationKind,
	pub event: String,
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	/// Property expression to segment by. Required for every kind except
	/// [`SegmentationKind::Plain`].
	pub on: Option<String>,
	pub unit: Option<Unit>,
	pub where_clause: Option<String>,
	/// Only sent for [`SegmentationKind::Plain`].
	pub limit: Option<u32>,
	/// Ignored by the sum and average reports.
	pub event_type: Option<EventType>,
}

impl SegmentationQuery {
	pub fn new(event: impl Into<String>, from_date: NaiveDate, to_date: NaiveDate) -> Self {
		Self {
			kind: SegmentationKind::Plain,
			event: event.into(),
			from_date,
			to_date,
			on: None,
			unit: None,
			where_clause: None,
			limit: None,
			event_type: None,
		}
	}

	pub fn numeric(
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
		buckets: Option<u32>,
	) -> Self {
		Self::new(event, from_date, to_date)
			.kind(SegmentationKind::Numeric { buckets })
			.on(on)
	}

	pub fn sum(
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
	) -> Self {
		Self::new(event, from_date, to_date)
			.kind(SegmentationKind::Sum)
			.on(on)
	}

	pub fn average(
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
	) -> Self {
		Self::new(event, from_date, to_date)
			.kind(SegmentationKind::Average)
			.on(on)
	}

	pub fn kind(mut self, kind: SegmentationKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn on(mut self, expression: impl Into<String>) -> Self {
		self.on = Some(expression.into());
		self
	}

	pub fn unit(mut self, unit: Unit) -> Self {
		self.unit = Some(unit);
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

	pub fn event_type(mut self, event_type: EventType) -> Self {
		self.event_type = Some(event_type);
		self
	}
}

impl Query for SegmentationQuery {
	fn endpoint(&self) -> &'static str {
		self.kind.endpoint()
	}

	fn to_params(&self) -> Result<Params> {
		require_non_empty("event", &self.event)?;
		require_date_range(self.from_date, self.to_date)?;
		require_positive_opt("limit", self.limit)?;

		let on = self.on.as_deref().filter(|on| !on.is_empty());
		if on.is_none() && self.kind != SegmentationKind::Plain {
			return Err(QueryError::InvalidArgument(format!(
				"`on` is required for {}",
				self.kind.endpoint()
			)));
		}

		let mut params = Params::new()
			.with("event", self.event.as_str())
			.with("from_date", self.from_date)
			.with("to_date", self.to_date);
		params.insert_opt("on", on);
		params.insert_opt("unit", self.unit);
		params.insert_opt("where", self.where_clause.as_deref());

		match self.kind {
			SegmentationKind::Plain => {
				params.insert_opt("limit", self.limit);
				params.insert_opt("type", self.event_type);
			}
			SegmentationKind::Numeric { buckets } => {
				require_positive_opt("buckets", buckets)?;
				params.insert_opt("buckets", buckets);
				params.insert_opt("type", self.event_type);
			}
			SegmentationKind::Sum | SegmentationKind::Average => {}
		}

		Ok(params)
	}
}
