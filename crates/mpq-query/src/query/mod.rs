// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Typed requests for each Data Export API endpoint.
//!
//! Every query type validates its arguments and builds the endpoint's
//! [`Params`] in [`Query::to_params`]. Nothing here touches the network, so
//! a query that fails validation never produces a request.

mod engage;
mod events;
mod export;
mod funnels;
mod retention;
mod segmentation;

use chrono::NaiveDate;

use crate::error::{QueryError, Result};
use crate::params::Params;

pub use engage::{EngagePage, EngageQuery};
pub use events::{
	EventNamesQuery, EventPropertiesQuery, EventPropertyValuesQuery, EventsQuery,
	TopEventPropertiesQuery, TopEventsQuery,
};
pub use export::ExportQuery;
pub use funnels::{FunnelListQuery, FunnelQuery};
pub use retention::RetentionQuery;
pub use segmentation::{SegmentationKind, SegmentationQuery};

/// Which API host an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiBase {
	/// `https://mixpanel.com/api`
	Query,
	/// `https://data.mixpanel.com/api`, raw event export.
	Data,
}

/// A request against one endpoint.
pub trait Query {
	/// Path below `/2.0/`, e.g. `events/top`.
	fn endpoint(&self) -> &'static str;

	fn base(&self) -> ApiBase {
		ApiBase::Query
	}

	/// Validates the arguments and builds the parameter mapping.
	fn to_params(&self) -> Result<Params>;
}

pub(crate) fn collect_names<I, S>(names: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	names.into_iter().map(Into::into).collect()
}

pub(crate) fn require_event_names(names: &[String]) -> Result<()> {
	if names.is_empty() || names.iter().any(|n| n.is_empty()) {
		return Err(QueryError::EmptyEventNames);
	}
	Ok(())
}

pub(crate) fn require_positive(name: &'static str, value: u32) -> Result<()> {
	if value == 0 {
		return Err(QueryError::InvalidInterval { name });
	}
	Ok(())
}

pub(crate) fn require_positive_opt(name: &'static str, value: Option<u32>) -> Result<()> {
	match value {
		Some(v) => require_positive(name, v),
		None => Ok(()),
	}
}

pub(crate) fn require_non_empty(name: &str, value: &str) -> Result<()> {
	if value.is_empty() {
		return Err(QueryError::InvalidArgument(format!("`{name}` cannot be empty")));
	}
	Ok(())
}

pub(crate) fn require_date_range(from: NaiveDate, to: NaiveDate) -> Result<()> {
	if from > to {
		return Err(QueryError::InvalidDateRange { from, to });
	}
	Ok(())
}
