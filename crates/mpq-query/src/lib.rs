// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client for the Mixpanel Data Export API.
//!
//! This crate sends authenticated, read-only queries to Mixpanel's analytics
//! endpoints (events, properties, funnels, segmentation, retention, people
//! profiles and raw export) and returns the decoded JSON.
//!
//! # Authentication
//!
//! Requests are authenticated with either an MD5 request signature
//! ([`SignatureAuth`], the default) or a basic-auth header carrying the API
//! secret ([`SecretAuth`]). See [`auth`] for details.
//!
//! # Example
//!
//! ```ignore
//! use mpq_query::{EventType, MixpanelQueryClient, QueryConfig, Unit};
//!
//! let config = QueryConfig::from_env()?;
//! let client = MixpanelQueryClient::from_config(&config)?;
//!
//! let top = client.get_top_events(EventType::General, Some(10)).await?;
//! let signups = client.get_events_unique(["signup"], Unit::Day, 7).await?;
//! ```
//!
//! Argument validation happens before anything is sent: a query with an empty
//! event list or a zero interval fails with a [`QueryError`] and makes no
//! network request.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod paginator;
pub mod params;
pub mod query;
pub mod types;

pub use auth::{
	signature, AuthKind, AuthStrategy, AuthenticatedRequest, Credentials, SecretAuth,
	SignatureAuth, DEFAULT_EXPIRATION,
};
pub use client::{MixpanelQueryClient, MixpanelQueryClientBuilder, API_VERSION};
pub use config::{ConfigError, QueryConfig};
pub use error::{QueryError, Result};
pub use mpq_common_secret::SecretString;
pub use paginator::{ConcurrentPaginator, PageSource, DEFAULT_CONCURRENCY};
pub use params::{ParamValue, Params};
pub use query::{
	ApiBase, EngagePage, EngageQuery, EventNamesQuery, EventPropertiesQuery,
	EventPropertyValuesQuery, EventsQuery, ExportQuery, FunnelListQuery, FunnelQuery, Query,
	RetentionQuery, SegmentationKind, SegmentationQuery, TopEventPropertiesQuery, TopEventsQuery,
};
pub use types::{EventType, ResponseFormat, RetentionType, Unit};
