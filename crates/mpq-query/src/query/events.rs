// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Event and event-property queries.

use super::{
	collect_names, require_event_names, require_non_empty, require_positive, require_positive_opt,
	Query,
};
use crate::error::Result;
use crate::params::Params;
use crate::types::{EventType, Unit};

/// Aggregate counts for a set of events over the last `interval` units.
///
/// `GET /2.0/events`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsQuery {
	pub event_names: Vec<String>,
	pub event_type: EventType,
	pub unit: Unit,
	/// Number of units to return; `1` is the current unit only.
	pub interval: u32,
}

impl EventsQuery {
	pub fn new<I, S>(event_names: I, event_type: EventType, unit: Unit, interval: u32) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			event_names: collect_names(event_names),
			event_type,
			unit,
			interval,
		}
	}

	/// Unique-user counts.
	pub fn unique<I, S>(event_names: I, unit: Unit, interval: u32) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(event_names, EventType::Unique, unit, interval)
	}
}

impl Query for EventsQuery {
	fn endpoint(&self) -> &'static str {
		"events"
	}

	fn to_params(&self) -> Result<Params> {
		require_event_names(&self.event_names)?;
		require_positive("interval", self.interval)?;

		Ok(Params::new()
			.with("event", self.event_names.clone())
			.with("type", self.event_type)
			.with("unit", self.unit)
			.with("interval", self.interval))
	}
}

/// Today's most common events.
///
/// `GET /2.0/events/top`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEventsQuery {
	pub event_type: EventType,
	pub limit: Option<u32>,
}

impl TopEventsQuery {
	pub fn new(event_type: EventType) -> Self {
		Self {
			event_type,
			limit: None,
		}
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for TopEventsQuery {
	fn endpoint(&self) -> &'static str {
		"events/top"
	}

	fn to_params(&self) -> Result<Params> {
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new().with("type", self.event_type);
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}

/// The most common event names over the last 31 days.
///
/// `GET /2.0/events/names`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNamesQuery {
	pub event_type: EventType,
	pub limit: Option<u32>,
}

impl EventNamesQuery {
	pub fn new(event_type: EventType) -> Self {
		Self {
			event_type,
			limit: None,
		}
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for EventNamesQuery {
	fn endpoint(&self) -> &'static str {
		"events/names"
	}

	fn to_params(&self) -> Result<Params> {
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new().with("type", self.event_type);
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}

/// Counts for one event broken down by the values of one property.
///
/// `GET /2.0/events/properties`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPropertiesQuery {
	pub event: String,
	pub name: String,
	/// Restrict the breakdown to these property values.
	pub values: Vec<String>,
	pub event_type: EventType,
	pub unit: Unit,
	pub interval: u32,
	pub limit: Option<u32>,
}

impl EventPropertiesQuery {
	pub fn new(
		event: impl Into<String>,
		name: impl Into<String>,
		event_type: EventType,
		unit: Unit,
		interval: u32,
	) -> Self {
		Self {
			event: event.into(),
			name: name.into(),
			values: Vec::new(),
			event_type,
			unit,
			interval,
			limit: None,
		}
	}

	pub fn values<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.values = collect_names(values);
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for EventPropertiesQuery {
	fn endpoint(&self) -> &'static str {
		"events/properties"
	}

	fn to_params(&self) -> Result<Params> {
		require_non_empty("event", &self.event)?;
		require_non_empty("name", &self.name)?;
		require_positive("interval", self.interval)?;
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new()
			.with("event", self.event.as_str())
			.with("name", self.name.as_str())
			.with("values", self.values.clone())
			.with("type", self.event_type)
			.with("unit", self.unit)
			.with("interval", self.interval);
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}

/// The most common properties recorded for an event.
///
/// `GET /2.0/events/properties/top`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEventPropertiesQuery {
	pub event: String,
	pub limit: Option<u32>,
}

impl TopEventPropertiesQuery {
	pub fn new(event: impl Into<String>) -> Self {
		Self {
			event: event.into(),
			limit: None,
		}
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}
}

impl Query for TopEventPropertiesQuery {
	fn endpoint(&self) -> &'static str {
		"events/properties/top"
	}

	fn to_params(&self) -> Result<Params> {
		require_non_empty("event", &self.event)?;
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new().with("event", self.event.as_str());
		params.insert_opt("limit", self.limit);
		Ok(params)
	}
}

/// The most common values of one event property.
///
/// `GET /2.0/events/properties/values`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPropertyValuesQuery {
	pub event: String,
	pub name: String,
	pub limit: Option<u32>,
	/// Required by Mixpanel only for numerically bucketed properties.
	pub bucket: Option<String>,
}

impl EventPropertyValuesQuery {
	pub fn new(event: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			event: event.into(),
			name: name.into(),
			limit: None,
			bucket: None,
		}
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
		self.bucket = Some(bucket.into());
		self
	}
}

impl Query for EventPropertyValuesQuery {
	fn endpoint(&self) -> &'static str {
		"events/properties/values"
	}

	fn to_params(&self) -> Result<Params> {
		require_non_empty("event", &self.event)?;
		require_non_empty("name", &self.name)?;
		require_positive_opt("limit", self.limit)?;

		let mut params = Params::new()
			.with("event", self.event.as_str())
			.with("name", self.name.as_str());
		params.insert_opt("limit", self.limit);
		params.insert_opt("bucket", self.bucket.as_deref());
		Ok(params)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::QueryError;
	use crate::params::ParamValue;

	#[test]
	fn unique_events_params() {
		let params = EventsQuery::unique(["X"], Unit::Hour, 24).to_params().unwrap();

		assert_eq!(
			params.get("event"),
			Some(&ParamValue::List(vec!["X".to_string()]))
		);
		assert_eq!(params.get("unit"), Some(&ParamValue::from("hour")));
		assert_eq!(params.get("interval"), Some(&ParamValue::Integer(24)));
		assert_eq!(params.get("type"), Some(&ParamValue::from("unique")));
		assert_eq!(params.len(), 4);
	}

	#[test]
	fn events_require_names() {
		let err = EventsQuery::unique(Vec::<String>::new(), Unit::Day, 7)
			.to_params()
			.unwrap_err();
		assert!(matches!(err, QueryError::EmptyEventNames));
	}

	#[test]
	fn events_require_positive_interval() {
		let err = EventsQuery::new(["X"], EventType::General, Unit::Day, 0)
			.to_params()
			.unwrap_err();
		assert!(matches!(err, QueryError::InvalidInterval { name: "interval" }));
	}

	#[test]
	fn top_events_limit_is_optional() {
		let params = TopEventsQuery::new(EventType::General).to_params().unwrap();
		assert!(!params.contains_key("limit"));

		let params = TopEventsQuery::new(EventType::General)
			.limit(5)
			.to_params()
			.unwrap();
		assert_eq!(params.get("limit"), Some(&ParamValue::Integer(5)));
	}

	#[test]
	fn event_names_endpoint() {
		let query = EventNamesQuery::new(EventType::Unique).limit(10);
		assert_eq!(query.endpoint(), "events/names");
		assert_eq!(
			query.to_params().unwrap().get("type"),
			Some(&ParamValue::from("unique"))
		);
	}

	#[test]
	fn event_properties_params() {
		let params = EventPropertiesQuery::new("signup", "plan", EventType::General, Unit::Week, 4)
			.values(["free", "pro"])
			.to_params()
			.unwrap();

		assert_eq!(params.get("event"), Some(&ParamValue::from("signup")));
		assert_eq!(params.get("name"), Some(&ParamValue::from("plan")));
		assert_eq!(
			params.get("values").unwrap().to_wire(),
			r#"["free","pro"]"#
		);
		assert_eq!(params.get("unit"), Some(&ParamValue::from("week")));
	}

	#[test]
	fn event_properties_require_event() {
		let err = EventPropertiesQuery::new("", "plan", EventType::General, Unit::Day, 1)
			.to_params()
			.unwrap_err();
		assert!(err.is_validation());
	}

	#[test]
	fn property_values_bucket() {
		let params = EventPropertyValuesQuery::new("purchase", "amount")
			.bucket("0-100")
			.to_params()
			.unwrap();
		assert_eq!(params.get("bucket"), Some(&ParamValue::from("0-100")));

		let params = TopEventPropertiesQuery::new("purchase").to_params().unwrap();
		assert_eq!(params.len(), 1);
	}
}
