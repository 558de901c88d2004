// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Mixpanel Data Export API client implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use mpq_common_secret::SecretString;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace};

use crate::auth::{AuthKind, AuthStrategy, Credentials, SignatureAuth};
use crate::config::{QueryConfig, DEFAULT_BASE_URL, DEFAULT_DATA_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{QueryError, Result};
use crate::params::Params;
use crate::query::{
	ApiBase, EngagePage, EngageQuery, EventNamesQuery, EventPropertiesQuery,
	EventPropertyValuesQuery, EventsQuery, ExportQuery, FunnelListQuery, FunnelQuery, Query,
	RetentionQuery, SegmentationQuery, TopEventPropertiesQuery, TopEventsQuery,
};
use crate::types::{EventType, ResponseFormat, Unit};

/// Data Export API version segment.
pub const API_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
struct MixpanelErrorResponse {
	error: String,
}

/// Builder for constructing a [`MixpanelQueryClient`].
#[derive(Debug, Default)]
pub struct MixpanelQueryClientBuilder {
	api_key: Option<String>,
	api_secret: Option<SecretString>,
	auth: Option<Box<dyn AuthStrategy>>,
	base_url: Option<String>,
	data_base_url: Option<String>,
	request_timeout: Option<Duration>,
}

impl MixpanelQueryClientBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	pub fn api_secret(mut self, api_secret: impl Into<SecretString>) -> Self {
		self.api_secret = Some(api_secret.into());
		self
	}

	/// Selects a built-in auth strategy. Signature auth is the default.
	pub fn auth_kind(mut self, kind: AuthKind) -> Self {
		self.auth = Some(kind.strategy());
		self
	}

	/// Uses a custom auth strategy.
	pub fn auth_strategy(mut self, strategy: impl AuthStrategy + 'static) -> Self {
		self.auth = Some(Box::new(strategy));
		self
	}

	/// Sets a custom query API base URL (useful for testing).
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}

	/// Sets a custom raw export base URL (useful for testing).
	pub fn data_base_url(mut self, data_base_url: impl Into<String>) -> Self {
		self.data_base_url = Some(data_base_url.into());
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);
		self
	}

	/// Builds the client.
	///
	/// # Errors
	///
	/// Returns [`QueryError::InvalidArgument`] if the API key or secret is
	/// missing or empty, and [`QueryError::Network`] if the HTTP client
	/// cannot be constructed.
	pub fn build(self) -> Result<MixpanelQueryClient> {
		let api_key = self
			.api_key
			.filter(|k| !k.is_empty())
			.ok_or_else(|| QueryError::InvalidArgument("api_key is required".to_string()))?;
		let api_secret = self
			.api_secret
			.filter(|s| !s.is_empty())
			.ok_or_else(|| QueryError::InvalidArgument("api_secret is required".to_string()))?;

		let base_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
			.trim_end_matches('/')
			.to_string();
		let data_base_url = self
			.data_base_url
			.unwrap_or_else(|| DEFAULT_DATA_BASE_URL.to_string())
			.trim_end_matches('/')
			.to_string();
		let auth = self
			.auth
			.unwrap_or_else(|| Box::new(SignatureAuth::default()));

		let http_client = mpq_common_http::builder()
			.timeout(self.request_timeout.unwrap_or(DEFAULT_TIMEOUT))
			.build()
			.map_err(QueryError::Network)?;

		info!(
			base_url = %base_url,
			auth = %auth.kind(),
			"Mixpanel query client initialized"
		);

		Ok(MixpanelQueryClient {
			inner: Arc::new(ClientInner {
				credentials: Credentials { api_key, api_secret },
				auth,
				base_url,
				data_base_url,
				http_client,
			}),
		})
	}
}

#[derive(Debug)]
struct ClientInner {
	credentials: Credentials,
	auth: Box<dyn AuthStrategy>,
	base_url: String,
	data_base_url: String,
	http_client: Client,
}

/// Client for the Mixpanel Data Export API.
///
/// Cloning is cheap; clones share credentials and the connection pool.
///
/// # Example
///
/// ```ignore
/// use mpq_query::{MixpanelQueryClient, Unit};
///
/// let client = MixpanelQueryClient::new("api_key", "api_secret")?;
/// let data = client.get_events_unique(["play song"], Unit::Day, 7).await?;
/// println!("{}", data["data"]["series"]);
/// ```
#[derive(Debug, Clone)]
pub struct MixpanelQueryClient {
	inner: Arc<ClientInner>,
}

impl MixpanelQueryClient {
	/// Creates a client with signature auth and default endpoints.
	pub fn new(api_key: impl Into<String>, api_secret: impl Into<SecretString>) -> Result<Self> {
		Self::builder().api_key(api_key).api_secret(api_secret).build()
	}

	pub fn builder() -> MixpanelQueryClientBuilder {
		MixpanelQueryClientBuilder::new()
	}

	/// Creates a client from a loaded [`QueryConfig`].
	pub fn from_config(config: &QueryConfig) -> Result<Self> {
		Self::builder()
			.api_key(config.api_key.clone())
			.api_secret(config.api_secret.clone())
			.auth_kind(config.auth)
			.base_url(config.base_url.clone())
			.data_base_url(config.data_base_url.clone())
			.request_timeout(config.request_timeout)
			.build()
	}

	pub fn auth_kind(&self) -> AuthKind {
		self.inner.auth.kind()
	}

	pub fn api_key(&self) -> &str {
		&self.inner.credentials.api_key
	}

	/// Full URL for `endpoint` on the given API host.
	pub fn endpoint_url(&self, base: ApiBase, endpoint: &str) -> String {
		let base_url = match base {
			ApiBase::Query => &self.inner.base_url,
			ApiBase::Data => &self.inner.data_base_url,
		};
		format!("{base_url}/{API_VERSION}/{endpoint}")
	}

	/// Runs any typed query and returns the decoded JSON body.
	///
	/// Validation errors are returned before any request is sent.
	#[instrument(skip(self, query), fields(endpoint = query.endpoint()))]
	pub async fn query<Q: Query + ?Sized>(&self, query: &Q) -> Result<Value> {
		let params = query.to_params()?;
		let body = self
			.send(query.base(), query.endpoint(), params, Some(ResponseFormat::Json))
			.await?;
		parse_json(&body)
	}

	/// Issues a request against an arbitrary query endpoint with
	/// `format=json` and decodes the body.
	#[instrument(skip(self, params))]
	pub async fn request(&self, endpoint: &str, params: Params) -> Result<Value> {
		let body = self
			.send(ApiBase::Query, endpoint, params, Some(ResponseFormat::Json))
			.await?;
		parse_json(&body)
	}

	/// Issues a request and returns the undecoded body, e.g. for CSV.
	#[instrument(skip(self, params))]
	pub async fn request_raw(
		&self,
		endpoint: &str,
		params: Params,
		format: ResponseFormat,
	) -> Result<String> {
		self.send(ApiBase::Query, endpoint, params, Some(format)).await
	}

	/// Runs a typed query and returns the undecoded body in `format`.
	pub async fn query_raw<Q: Query + ?Sized>(
		&self,
		query: &Q,
		format: ResponseFormat,
	) -> Result<String> {
		let params = query.to_params()?;
		self
			.send(query.base(), query.endpoint(), params, Some(format))
			.await
	}

	// Events

	/// Event counts for `event_names` over the last `interval` units.
	pub async fn get_events<I, S>(
		&self,
		event_names: I,
		event_type: EventType,
		unit: Unit,
		interval: u32,
	) -> Result<Value>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self
			.query(&EventsQuery::new(event_names, event_type, unit, interval))
			.await
	}

	/// Unique-user counts for `event_names` over the last `interval` units.
	///
	/// Response shape:
	///
	/// ```json
	/// {
	///   "data": {
	///     "series": ["2014-07-11", "2014-07-12"],
	///     "values": { "Guide Download": { "2014-07-11": 80, "2014-07-12": 100 } }
	///   },
	///   "legend_size": 1
	/// }
	/// ```
	pub async fn get_events_unique<I, S>(
		&self,
		event_names: I,
		unit: Unit,
		interval: u32,
	) -> Result<Value>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self
			.query(&EventsQuery::unique(event_names, unit, interval))
			.await
	}

	pub async fn get_top_events(&self, event_type: EventType, limit: Option<u32>) -> Result<Value> {
		let mut query = TopEventsQuery::new(event_type);
		query.limit = limit;
		self.query(&query).await
	}

	pub async fn get_event_names(
		&self,
		event_type: EventType,
		limit: Option<u32>,
	) -> Result<Value> {
		let mut query = EventNamesQuery::new(event_type);
		query.limit = limit;
		self.query(&query).await
	}

	// Event properties

	pub async fn get_event_properties(&self, query: &EventPropertiesQuery) -> Result<Value> {
		self.query(query).await
	}

	pub async fn get_top_event_properties(
		&self,
		event: impl Into<String>,
		limit: Option<u32>,
	) -> Result<Value> {
		let mut query = TopEventPropertiesQuery::new(event);
		query.limit = limit;
		self.query(&query).await
	}

	pub async fn get_event_property_values(
		&self,
		query: &EventPropertyValuesQuery,
	) -> Result<Value> {
		self.query(query).await
	}

	// Funnels

	pub async fn get_funnel(&self, query: &FunnelQuery) -> Result<Value> {
		self.query(query).await
	}

	pub async fn list_funnels(&self) -> Result<Value> {
		self.query(&FunnelListQuery).await
	}

	// Segmentation

	pub async fn get_segmentation(&self, query: &SegmentationQuery) -> Result<Value> {
		self.query(query).await
	}

	pub async fn get_segmentation_numeric(
		&self,
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
		buckets: Option<u32>,
	) -> Result<Value> {
		self
			.query(&SegmentationQuery::numeric(event, from_date, to_date, on, buckets))
			.await
	}

	pub async fn get_segmentation_sum(
		&self,
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
	) -> Result<Value> {
		self
			.query(&SegmentationQuery::sum(event, from_date, to_date, on))
			.await
	}

	pub async fn get_segmentation_average(
		&self,
		event: impl Into<String>,
		from_date: NaiveDate,
		to_date: NaiveDate,
		on: impl Into<String>,
	) -> Result<Value> {
		self
			.query(&SegmentationQuery::average(event, from_date, to_date, on))
			.await
	}

	// Retention

	pub async fn get_retention(&self, query: &RetentionQuery) -> Result<Value> {
		self.query(query).await
	}

	// People

	/// Fetches one page of people profiles.
	pub async fn get_engage(&self, query: &EngageQuery) -> Result<EngagePage> {
		let value = self.query(query).await?;
		serde_json::from_value(value).map_err(|e| {
			error!(error = %e, "Unexpected engage response shape");
			QueryError::InvalidResponse(format!("engage page: {e}"))
		})
	}

	// Raw export

	/// Downloads raw events. The body is JSON lines; each line becomes one
	/// element of the returned vector.
	#[instrument(skip(self, query), fields(from = %query.from_date, to = %query.to_date))]
	pub async fn export(&self, query: &ExportQuery) -> Result<Vec<Value>> {
		let params = query.to_params()?;
		let body = self
			.send(query.base(), query.endpoint(), params, None)
			.await?;

		let events = body
			.lines()
			.map(str::trim)
			.filter(|line| !line.is_empty())
			.map(parse_json)
			.collect::<Result<Vec<_>>>()?;

		debug!(count = events.len(), "Export completed");
		Ok(events)
	}

	async fn send(
		&self,
		base: ApiBase,
		endpoint: &str,
		mut params: Params,
		format: Option<ResponseFormat>,
	) -> Result<String> {
		params.insert_opt("format", format);
		params.prune_empty();

		let request = self
			.inner
			.auth
			.authenticate(&self.inner.credentials, params);
		let url = self.endpoint_url(base, endpoint);

		debug!(url = %url, auth = %self.inner.auth.kind(), "Sending request to Mixpanel");
		trace!(
			params = ?request
				.params
				.iter()
				.filter(|(k, _)| k.as_str() != "sig")
				.map(|(k, v)| format!("{k}={v}"))
				.collect::<Vec<_>>(),
			"Request parameters"
		);

		let mut builder = self
			.inner
			.http_client
			.get(&url)
			.query(&request.params.to_query_pairs());
		if let Some(authorization) = &request.authorization {
			builder = builder.header(AUTHORIZATION, authorization.expose().as_str());
		}

		let started = Instant::now();
		let response = builder.send().await.map_err(|e| {
			if e.is_timeout() {
				error!(endpoint, "Request timed out");
				return QueryError::Timeout;
			}
			error!(error = %e, endpoint, "Network error during Mixpanel request");
			QueryError::Network(e)
		})?;

		let status = response.status();
		debug!(
			status = %status,
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Received response from Mixpanel"
		);

		if !status.is_success() {
			let status_code = status.as_u16();
			let body = response.text().await.unwrap_or_default();
			return Err(status_error(status_code, body));
		}

		response.text().await.map_err(|e| {
			error!(error = %e, "Failed to read response body");
			QueryError::Network(e)
		})
	}
}

fn parse_json(body: &str) -> Result<Value> {
	serde_json::from_str(body).map_err(|e| {
		error!(error = %e, "Failed to parse Mixpanel response");
		QueryError::InvalidResponse(format!("JSON parse error: {e}"))
	})
}

fn status_error(status: u16, body: String) -> QueryError {
	let message = serde_json::from_str::<MixpanelErrorResponse>(&body)
		.map(|r| r.error)
		.unwrap_or(body);

	match status {
		401 | 403 => {
			error!(status, "Unauthorized request");
			QueryError::Unauthorized
		}
		429 => {
			error!(status, "Rate limit exceeded");
			QueryError::RateLimited
		}
		400 if message.to_lowercase().contains("expired") => {
			error!(status, message = %message, "Request expired");
			QueryError::ExpiredRequest
		}
		_ => {
			error!(status, message = %message, "Mixpanel API error");
			QueryError::ApiError { status, message }
		}
	}
}
