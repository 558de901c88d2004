// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request parameter mapping.
//!
//! [`Params`] is a sorted map from parameter name to [`ParamValue`]. Keys are
//! kept in lexicographic order at all times, which is the order the MD5
//! request signature is computed in.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::types::{EventType, ResponseFormat, RetentionType, Unit};

/// Wire format for date parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
	Text(String),
	Integer(i64),
	/// Sent as a JSON array, e.g. `["signup","login"]`.
	List(Vec<String>),
	/// Sent as `YYYY-MM-DD`.
	Date(NaiveDate),
}

impl ParamValue {
	/// Returns the string that goes on the wire and into the signature.
	pub fn to_wire(&self) -> String {
		match self {
			ParamValue::Text(s) => s.clone(),
			ParamValue::Integer(n) => n.to_string(),
			ParamValue::List(items) => serde_json::Value::from(items.clone()).to_string(),
			ParamValue::Date(d) => d.format(DATE_FORMAT).to_string(),
		}
	}

	/// Empty strings and empty lists carry no information and are dropped
	/// before a request is signed.
	pub fn is_empty(&self) -> bool {
		match self {
			ParamValue::Text(s) => s.is_empty(),
			ParamValue::List(items) => items.is_empty(),
			ParamValue::Integer(_) | ParamValue::Date(_) => false,
		}
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_wire())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		ParamValue::Text(value)
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		ParamValue::Text(value.to_string())
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		ParamValue::Integer(value)
	}
}

impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		ParamValue::Integer(i64::from(value))
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(value: Vec<String>) -> Self {
		ParamValue::List(value)
	}
}

impl From<&[&str]> for ParamValue {
	fn from(value: &[&str]) -> Self {
		ParamValue::List(value.iter().map(|s| s.to_string()).collect())
	}
}

impl From<NaiveDate> for ParamValue {
	fn from(value: NaiveDate) -> Self {
		ParamValue::Date(value)
	}
}

macro_rules! text_param_from {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for ParamValue {
				fn from(value: $ty) -> Self {
					ParamValue::Text(value.as_str().to_string())
				}
			}
		)*
	};
}

text_param_from!(Unit, EventType, ResponseFormat, RetentionType);

/// Sorted mapping of request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Inserts a value, returning the previous one for that key.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<ParamValue>,
	) -> Option<ParamValue> {
		self.0.insert(key.into(), value.into())
	}

	/// Inserts a value only when it is present.
	pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
		if let Some(value) = value {
			self.insert(key, value);
		}
	}

	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0.get(key)
	}

	pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
		self.0.remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates in key order.
	pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
		self.0.iter()
	}

	/// Drops empty strings and empty lists.
	pub fn prune_empty(&mut self) {
		self.0.retain(|_, value| !value.is_empty());
	}

	/// Returns `(name, wire value)` pairs in key order.
	pub fn to_query_pairs(&self) -> Vec<(String, String)> {
		self
			.0
			.iter()
			.map(|(key, value)| (key.clone(), value.to_wire()))
			.collect()
	}

	/// Concatenates `key=value` for every parameter in key order, with no
	/// separator between pairs. This is the string the signature hashes.
	pub fn signing_string(&self) -> String {
		self
			.0
			.iter()
			.map(|(key, value)| format!("{key}={}", value.to_wire()))
			.collect()
	}
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Params::new();
		for (key, value) in iter {
			params.insert(key, value);
		}
		params
	}
}

impl<'a> IntoIterator for &'a Params {
	type Item = (&'a String, &'a ParamValue);
	type IntoIter = btree_map::Iter<'a, String, ParamValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lists_are_json_encoded() {
		let value = ParamValue::from(vec!["play song".to_string(), "log in".to_string()]);
		assert_eq!(value.to_wire(), r#"["play song","log in"]"#);
	}

	#[test]
	fn dates_use_iso_format() {
		let date = NaiveDate::from_ymd_opt(2014, 7, 1).unwrap();
		assert_eq!(ParamValue::from(date).to_wire(), "2014-07-01");
	}

	#[test]
	fn enums_convert_to_text() {
		assert_eq!(ParamValue::from(Unit::Hour), ParamValue::Text("hour".to_string()));
		assert_eq!(
			ParamValue::from(EventType::Unique),
			ParamValue::Text("unique".to_string())
		);
	}

	#[test]
	fn keys_iterate_sorted() {
		let params = Params::new()
			.with("unit", Unit::Day)
			.with("event", vec!["a".to_string()])
			.with("interval", 7u32);
		let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["event", "interval", "unit"]);
	}

	#[test]
	fn signing_string_concatenates_pairs() {
		let params = Params::new().with("b", 2i64).with("a", "x");
		assert_eq!(params.signing_string(), "a=xb=2");
	}

	#[test]
	fn prune_empty_drops_blank_values() {
		let mut params = Params::new()
			.with("where", "")
			.with("event", Vec::<String>::new())
			.with("limit", 0i64)
			.with("on", "properties[\"$browser\"]");
		params.prune_empty();
		assert!(!params.contains_key("where"));
		assert!(!params.contains_key("event"));
		assert!(params.contains_key("limit"));
		assert!(params.contains_key("on"));
	}

	#[test]
	fn insert_opt_skips_none() {
		let mut params = Params::new();
		params.insert_opt("limit", None::<u32>);
		params.insert_opt("bucket", Some("x"));
		assert_eq!(params.len(), 1);
		assert_eq!(params.get("bucket"), Some(&ParamValue::from("x")));
	}
}
