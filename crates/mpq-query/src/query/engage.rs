// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! People profile queries.

use serde::{Deserialize, Serialize};

use super::{collect_names, Query};
use crate::error::Result;
use crate::params::Params;

/// One page of people profiles.
///
/// `GET /2.0/engage`
///
/// The first request is sent without `session_id` or `page`. Later pages
/// reuse the `session_id` from the first response; see
/// [`crate::ConcurrentPaginator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngageQuery {
	pub where_clause: Option<String>,
	pub session_id: Option<String>,
	pub page: Option<u32>,
	pub distinct_id: Option<String>,
	/// Only return these profile properties.
	pub output_properties: Vec<String>,
}

impl EngageQuery {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn where_clause(mut self, expression: impl Into<String>) -> Self {
		self.where_clause = Some(expression.into());
		self
	}

	pub fn distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	pub fn output_properties<I, S>(mut self, properties: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.output_properties = collect_names(properties);
		self
	}

	/// The same query positioned at `page` of session `session_id`.
	pub fn at_page(&self, session_id: impl Into<String>, page: u32) -> Self {
		Self {
			session_id: Some(session_id.into()),
			page: Some(page),
			..self.clone()
		}
	}
}

impl Query for EngageQuery {
	fn endpoint(&self) -> &'static str {
		"engage"
	}

	fn to_params(&self) -> Result<Params> {
		let mut params = Params::new();
		params.insert_opt("where", self.where_clause.as_deref());
		params.insert_opt("session_id", self.session_id.as_deref());
		params.insert_opt("page", self.page);
		params.insert_opt("distinct_id", self.distinct_id.as_deref());
		params.insert("output_properties", self.output_properties.clone());
		Ok(params)
	}
}

/// Response envelope of the `engage` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagePage {
	pub page: u32,
	pub page_size: u32,
	pub total: u64,
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub results: Vec<serde_json::Value>,
}

impl EngagePage {
	/// Total pages in the result set, counting from zero.
	pub fn page_count(&self) -> u32 {
		if self.page_size == 0 {
			return 0;
		}
		self.total.div_ceil(u64::from(self.page_size)) as u32
	}

	/// Pages after this one that still need to be fetched.
	pub fn remaining_pages(&self) -> std::ops::Range<u32> {
		let start = self.page.saturating_add(1);
		start..self.page_count().max(start)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::ParamValue;

	fn page(page: u32, page_size: u32, total: u64) -> EngagePage {
		EngagePage {
			page,
			page_size,
			total,
			session_id: Some("1234567890-EXAMPL".to_string()),
			status: Some("ok".to_string()),
			results: Vec::new(),
		}
	}

	#[test]
	fn first_page_query_has_no_paging_params() {
		let params = EngageQuery::new()
			.where_clause("properties[\"plan\"] == \"pro\"")
			.to_params()
			.unwrap();
		assert!(!params.contains_key("page"));
		assert!(!params.contains_key("session_id"));
		assert!(params.contains_key("where"));
	}

	#[test]
	fn at_page_sets_session_and_page() {
		let query = EngageQuery::new()
			.output_properties(["$email"])
			.at_page("abc", 3);
		let params = query.to_params().unwrap();
		assert_eq!(params.get("session_id"), Some(&ParamValue::from("abc")));
		assert_eq!(params.get("page"), Some(&ParamValue::Integer(3)));
		assert_eq!(
			params.get("output_properties").unwrap().to_wire(),
			r#"["$email"]"#
		);
	}

	#[test]
	fn remaining_pages_math() {
		assert_eq!(page(0, 1000, 2500).remaining_pages(), 1..3);
		assert_eq!(page(0, 1000, 1000).remaining_pages(), 1..1);
		assert_eq!(page(0, 10, 1).remaining_pages(), 1..1);
		assert!(page(0, 10, 0).remaining_pages().is_empty());
		assert!(page(0, 0, 10).remaining_pages().is_empty());
	}

	#[test]
	fn deserializes_engage_response() {
		let json = r#"{
			"page": 0,
			"page_size": 1000,
			"results": [{"$distinct_id": "u1", "$properties": {}}],
			"session_id": "1234567890-EXAMPL",
			"status": "ok",
			"total": 1
		}"#;
		let page: EngagePage = serde_json::from_str(json).unwrap();
		assert_eq!(page.results.len(), 1);
		assert_eq!(page.session_id.as_deref(), Some("1234567890-EXAMPL"));
	}
}
