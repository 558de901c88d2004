// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use mpq_query::{ConcurrentPaginator, EngageQuery, MixpanelQueryClient, QueryError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MixpanelQueryClient {
	MixpanelQueryClient::builder()
		.api_key("test_key")
		.api_secret("test_secret")
		.base_url(format!("{}/api", server.uri()))
		.build()
		.expect("client should build")
}

fn profile(id: &str) -> serde_json::Value {
	json!({ "$distinct_id": id, "$properties": { "$email": format!("{id}@example.com") } })
}

#[tokio::test]
async fn fetches_every_engage_page() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.and(query_param("page", "1"))
		.and(query_param("session_id", "sess-42"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 1,
			"page_size": 2,
			"total": 5,
			"session_id": "sess-42",
			"status": "ok",
			"results": [profile("c"), profile("d")]
		})))
		.with_priority(1)
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.and(query_param("page", "2"))
		.and(query_param("session_id", "sess-42"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 2,
			"page_size": 2,
			"total": 5,
			"session_id": "sess-42",
			"status": "ok",
			"results": [profile("e")]
		})))
		.with_priority(1)
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 0,
			"page_size": 2,
			"total": 5,
			"session_id": "sess-42",
			"status": "ok",
			"results": [profile("a"), profile("b")]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let paginator = ConcurrentPaginator::new(client_for(&server)).with_concurrency(4);
	let results = paginator
		.fetch_all(&EngageQuery::new().where_clause("properties[\"plan\"] == \"pro\""))
		.await
		.unwrap();

	let ids: Vec<_> = results
		.iter()
		.map(|r| r["$distinct_id"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);

	let requests = server.received_requests().await.unwrap();
	for request in &requests {
		assert!(request
			.url
			.query_pairs()
			.any(|(k, v)| k == "where" && v == "properties[\"plan\"] == \"pro\""));
	}
}

#[tokio::test]
async fn later_pages_without_totals_are_accepted() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.and(query_param("page", "1"))
		.and(query_param("session_id", "sess-7"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 1,
			"session_id": "sess-7",
			"results": [profile("b")]
		})))
		.with_priority(1)
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 0,
			"page_size": 1,
			"total": 2,
			"session_id": "sess-7",
			"status": "ok",
			"results": [profile("a")]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let paginator = ConcurrentPaginator::new(client_for(&server));
	let results = paginator.fetch_all(&EngageQuery::new()).await.unwrap();

	let ids: Vec<_> = results
		.iter()
		.map(|r| r["$distinct_id"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn page_failure_is_returned() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.and(query_param("page", "1"))
		.respond_with(ResponseTemplate::new(429))
		.with_priority(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path("/api/2.0/engage"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 0,
			"page_size": 1,
			"total": 2,
			"session_id": "sess-1",
			"status": "ok",
			"results": [profile("a")]
		})))
		.mount(&server)
		.await;

	let paginator = ConcurrentPaginator::new(client_for(&server));
	let err = paginator.fetch_all(&EngageQuery::new()).await.unwrap_err();
	assert!(matches!(err, QueryError::RateLimited));
}
