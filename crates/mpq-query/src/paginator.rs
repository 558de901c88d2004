// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Concurrent retrieval of every page of an `engage` result set.
//!
//! The first page is fetched on its own to learn `total`, `page_size` and
//! the `session_id`. The remaining pages are then requested with up to
//! `concurrency` requests in flight, and their results are concatenated in
//! page order. Only `results` is read from those later pages.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::client::MixpanelQueryClient;
use crate::error::{QueryError, Result};
use crate::query::{EngagePage, EngageQuery};

/// Default number of pages requested at once.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Something that can fetch a single `engage` page as undecoded JSON.
#[async_trait]
pub trait PageSource: Send + Sync {
	async fn fetch_page(&self, query: &EngageQuery) -> Result<Value>;
}

#[async_trait]
impl PageSource for MixpanelQueryClient {
	async fn fetch_page(&self, query: &EngageQuery) -> Result<Value> {
		self.query(query).await
	}
}

/// The part of a later page that is used.
#[derive(Debug, Deserialize)]
struct PageResults {
	results: Vec<Value>,
}

fn decode_page<T: DeserializeOwned>(value: Value) -> Result<T> {
	serde_json::from_value(value).map_err(|e| {
		error!(error = %e, "Unexpected engage response shape");
		QueryError::InvalidResponse(format!("engage page: {e}"))
	})
}

/// Fetches all pages of an `engage` query.
#[derive(Debug, Clone)]
pub struct ConcurrentPaginator<S> {
	source: S,
	concurrency: usize,
}

impl<S: PageSource> ConcurrentPaginator<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			concurrency: DEFAULT_CONCURRENCY,
		}
	}

	/// Sets the maximum number of requests in flight. Must be at least 1.
	pub fn with_concurrency(mut self, concurrency: usize) -> Self {
		self.concurrency = concurrency;
		self
	}

	pub fn concurrency(&self) -> usize {
		self.concurrency
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// Returns every profile matching `query`, in page order.
	///
	/// Any `session_id` or `page` already on `query` is ignored. The first
	/// error from any page aborts the whole fetch.
	#[instrument(skip(self, query), fields(concurrency = self.concurrency))]
	pub async fn fetch_all(&self, query: &EngageQuery) -> Result<Vec<Value>> {
		if self.concurrency == 0 {
			return Err(QueryError::InvalidArgument(
				"concurrency must be at least 1".to_string(),
			));
		}

		let first_query = EngageQuery {
			session_id: None,
			page: None,
			..query.clone()
		};
		let first: EngagePage = decode_page(self.source.fetch_page(&first_query).await?)?;

		let remaining = first.remaining_pages();
		debug!(
			total = first.total,
			page_size = first.page_size,
			remaining = remaining.len(),
			"Fetched first engage page"
		);

		let mut results = first.results;
		if remaining.is_empty() {
			return Ok(results);
		}

		let session_id = first.session_id.ok_or_else(|| {
			QueryError::InvalidResponse("engage response is missing session_id".to_string())
		})?;

		let page_queries: Vec<EngageQuery> = remaining
			.map(|page| query.at_page(session_id.as_str(), page))
			.collect();

		let pages: Vec<PageResults> = stream::iter(page_queries.iter())
			.map(|page_query| async move {
				decode_page::<PageResults>(self.source.fetch_page(page_query).await?)
			})
			.buffered(self.concurrency)
			.try_collect()
			.await?;

		for page in pages {
			results.extend(page.results);
		}

		info!(profiles = results.len(), "Fetched all engage pages");
		Ok(results)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use std::time::Duration;

	/// Serves `total` profiles `page_size` at a time. Later pages answer
	/// faster than earlier ones so out-of-order completion is exercised.
	struct MockSource {
		total: u64,
		page_size: u32,
		fail_page: Option<u32>,
		results_only: bool,
		requests: Mutex<Vec<EngageQuery>>,
		in_flight: AtomicUsize,
		max_in_flight: AtomicUsize,
	}

	impl MockSource {
		fn new(total: u64, page_size: u32) -> Self {
			Self {
				total,
				page_size,
				fail_page: None,
				results_only: false,
				requests: Mutex::new(Vec::new()),
				in_flight: AtomicUsize::new(0),
				max_in_flight: AtomicUsize::new(0),
			}
		}

		fn failing_on(mut self, page: u32) -> Self {
			self.fail_page = Some(page);
			self
		}

		/// Later pages carry only `page` and `results`.
		fn with_bare_later_pages(mut self) -> Self {
			self.results_only = true;
			self
		}
	}

	#[async_trait]
	impl PageSource for MockSource {
		async fn fetch_page(&self, query: &EngageQuery) -> Result<Value> {
			self.requests.lock().unwrap().push(query.clone());
			let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
			self.max_in_flight.fetch_max(now, Ordering::SeqCst);

			let page = query.page.unwrap_or(0);
			tokio::time::sleep(Duration::from_millis(u64::from(10u32.saturating_sub(page)))).await;
			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			if self.fail_page == Some(page) {
				return Err(QueryError::RateLimited);
			}

			let start = u64::from(page) * u64::from(self.page_size);
			let end = (start + u64::from(self.page_size)).min(self.total);
			let results: Vec<Value> = (start..end).map(|i| json!({ "$distinct_id": i })).collect();
			if page > 0 && self.results_only {
				return Ok(json!({ "page": page, "results": results }));
			}
			Ok(json!({
				"page": page,
				"page_size": self.page_size,
				"total": self.total,
				"session_id": "session-1",
				"status": "ok",
				"results": results,
			}))
		}
	}

	fn ids(results: &[Value]) -> Vec<u64> {
		results
			.iter()
			.map(|r| r["$distinct_id"].as_u64().unwrap())
			.collect()
	}

	#[tokio::test]
	async fn concatenates_pages_in_order() {
		let paginator = ConcurrentPaginator::new(MockSource::new(25, 10)).with_concurrency(3);
		let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();

		assert_eq!(ids(&results), (0..25).collect::<Vec<_>>());

		let requests = paginator.source().requests.lock().unwrap();
		assert_eq!(requests.len(), 3);
		assert_eq!(requests[0].page, None);
		assert_eq!(requests[0].session_id, None);
		for request in &requests[1..] {
			assert_eq!(request.session_id.as_deref(), Some("session-1"));
		}
	}

	#[tokio::test]
	async fn later_pages_need_only_results() {
		let source = MockSource::new(25, 10).with_bare_later_pages();
		let paginator = ConcurrentPaginator::new(source).with_concurrency(2);
		let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();
		assert_eq!(ids(&results), (0..25).collect::<Vec<_>>());
	}

	#[tokio::test]
	async fn malformed_first_page_is_invalid_response() {
		struct Bare;

		#[async_trait]
		impl PageSource for Bare {
			async fn fetch_page(&self, _query: &EngageQuery) -> Result<Value> {
				Ok(json!({ "results": [] }))
			}
		}

		let err = ConcurrentPaginator::new(Bare)
			.fetch_all(&EngageQuery::new())
			.await
			.unwrap_err();
		assert!(matches!(err, QueryError::InvalidResponse(_)));
	}

	#[tokio::test]
	async fn single_page_makes_one_request() {
		let paginator = ConcurrentPaginator::new(MockSource::new(5, 10));
		let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();
		assert_eq!(results.len(), 5);
		assert_eq!(paginator.source().requests.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn empty_result_set() {
		let paginator = ConcurrentPaginator::new(MockSource::new(0, 10));
		let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();
		assert!(results.is_empty());
	}

	#[tokio::test]
	async fn respects_concurrency_limit() {
		let paginator = ConcurrentPaginator::new(MockSource::new(100, 10)).with_concurrency(2);
		let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();
		assert_eq!(results.len(), 100);
		assert!(paginator.source().max_in_flight.load(Ordering::SeqCst) <= 2);
	}

	#[tokio::test]
	async fn page_error_aborts_fetch() {
		let paginator = ConcurrentPaginator::new(MockSource::new(50, 10).failing_on(3));
		let err = paginator.fetch_all(&EngageQuery::new()).await.unwrap_err();
		assert!(matches!(err, QueryError::RateLimited));
	}

	#[tokio::test]
	async fn zero_concurrency_rejected_without_requests() {
		let paginator = ConcurrentPaginator::new(MockSource::new(50, 10)).with_concurrency(0);
		let err = paginator.fetch_all(&EngageQuery::new()).await.unwrap_err();
		assert!(err.is_validation());
		assert!(paginator.source().requests.lock().unwrap().is_empty());
	}

	#[test]
	fn default_concurrency() {
		let paginator = ConcurrentPaginator::new(MockSource::new(0, 10));
		assert_eq!(paginator.concurrency(), DEFAULT_CONCURRENCY);
	}
}
