// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use mpq_query::{
	AuthKind, EngageQuery, EventNamesQuery, EventPropertiesQuery, EventPropertyValuesQuery,
	EventType, EventsQuery, ExportQuery, FunnelListQuery, FunnelQuery, Query, ResponseFormat,
	RetentionQuery, RetentionType, SegmentationKind, SegmentationQuery, TopEventPropertiesQuery,
	TopEventsQuery, Unit, DEFAULT_CONCURRENCY,
};

use crate::config::CliOverrides;

/// mpq - query the Mixpanel Data Export API
#[derive(Parser, Debug)]
#[command(name = "mpq", version, about, long_about = None)]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "MPQ_CONFIG")]
	pub config: Option<PathBuf>,

	/// Mixpanel project API key (overrides MIXPANEL_API_KEY)
	#[arg(long)]
	pub api_key: Option<String>,

	/// File containing the API secret (overrides MIXPANEL_API_SECRET)
	#[arg(long)]
	pub api_secret_file: Option<PathBuf>,

	/// Authentication strategy: signature or secret
	#[arg(long)]
	pub auth: Option<AuthKind>,

	/// Query API base URL
	#[arg(long)]
	pub base_url: Option<String>,

	/// Raw export API base URL
	#[arg(long)]
	pub data_base_url: Option<String>,

	/// Request timeout in seconds
	#[arg(long)]
	pub timeout_secs: Option<u64>,

	/// Response format: json or csv
	#[arg(long, global = true, default_value = "json")]
	pub format: ResponseFormat,

	/// Log level (overrides config)
	#[arg(short, long)]
	pub log_level: Option<String>,

	/// Output logs as JSON
	#[arg(long)]
	pub log_json: bool,

	#[command(subcommand)]
	pub command: Command,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		CliOverrides {
			api_key: args.api_key.clone(),
			api_secret_file: args.api_secret_file.clone(),
			auth: args.auth,
			base_url: args.base_url.clone(),
			data_base_url: args.data_base_url.clone(),
			timeout_secs: args.timeout_secs,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Counts for one or more events
	Events {
		/// Event names
		#[arg(required = true)]
		events: Vec<String>,
		#[arg(long = "type", default_value = "general")]
		event_type: EventType,
		#[arg(long, default_value = "day")]
		unit: Unit,
		/// Number of units to return
		#[arg(long, default_value_t = 7)]
		interval: u32,
	},
	/// Today's top events
	TopEvents {
		#[arg(long = "type", default_value = "general")]
		event_type: EventType,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Most common event names over the last 31 days
	EventNames {
		#[arg(long = "type", default_value = "general")]
		event_type: EventType,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Counts for an event broken down by one property
	EventProperties {
		event: String,
		/// Property name
		name: String,
		/// Only include these property values (repeatable)
		#[arg(long = "value")]
		values: Vec<String>,
		#[arg(long = "type", default_value = "general")]
		event_type: EventType,
		#[arg(long, default_value = "day")]
		unit: Unit,
		#[arg(long, default_value_t = 7)]
		interval: u32,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Most common properties of an event
	TopProperties {
		event: String,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Most common values of an event property
	PropertyValues {
		event: String,
		/// Property name
		name: String,
		#[arg(long)]
		limit: Option<u32>,
		#[arg(long)]
		bucket: Option<String>,
	},
	/// Conversion data for a saved funnel
	Funnel {
		funnel_id: u64,
		#[arg(long, requires = "to_date")]
		from_date: Option<NaiveDate>,
		#[arg(long, requires = "from_date")]
		to_date: Option<NaiveDate>,
		/// Days a user has to complete the funnel
		#[arg(long)]
		length: Option<u32>,
		#[arg(long)]
		interval: Option<u32>,
		#[arg(long)]
		unit: Option<Unit>,
		#[arg(long)]
		on: Option<String>,
		#[arg(long = "where")]
		where_clause: Option<String>,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// List saved funnels
	Funnels,
	/// Event data segmented by a property
	Segmentation(SegmentationArgs),
	/// Cohort retention
	Retention(RetentionArgs),
	/// People profiles
	Engage(EngageArgs),
	/// Download raw events as JSON lines
	Export {
		#[arg(long)]
		from_date: NaiveDate,
		#[arg(long)]
		to_date: NaiveDate,
		/// Only export these events (repeatable)
		#[arg(long = "event")]
		events: Vec<String>,
		#[arg(long = "where")]
		where_clause: Option<String>,
		#[arg(long)]
		limit: Option<u32>,
	},
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentationKindArg {
	#[default]
	Plain,
	Numeric,
	Sum,
	Average,
}

#[derive(ClapArgs, Debug)]
pub struct SegmentationArgs {
	pub event: String,
	#[arg(long)]
	pub from_date: NaiveDate,
	#[arg(long)]
	pub to_date: NaiveDate,
	#[arg(long, value_enum, default_value_t = SegmentationKindArg::Plain)]
	pub kind: SegmentationKindArg,
	/// Property expression to segment by
	#[arg(long)]
	pub on: Option<String>,
	/// Bucket count for numeric segmentation
	#[arg(long)]
	pub buckets: Option<u32>,
	#[arg(long)]
	pub unit: Option<Unit>,
	#[arg(long = "where")]
	pub where_clause: Option<String>,
	#[arg(long)]
	pub limit: Option<u32>,
	#[arg(long = "type")]
	pub event_type: Option<EventType>,
}

impl SegmentationArgs {
	fn to_query(&self) -> SegmentationQuery {
		let kind = match self.kind {
			SegmentationKindArg::Plain => SegmentationKind::Plain,
			SegmentationKindArg::Numeric => SegmentationKind::Numeric {
				buckets: self.buckets,
			},
			SegmentationKindArg::Sum => SegmentationKind::Sum,
			SegmentationKindArg::Average => SegmentationKind::Average,
		};
		SegmentationQuery {
			kind,
			event: self.event.clone(),
			from_date: self.from_date,
			to_date: self.to_date,
			on: self.on.clone(),
			unit: self.unit,
			where_clause: self.where_clause.clone(),
			limit: self.limit,
			event_type: self.event_type,
		}
	}
}

#[derive(ClapArgs, Debug)]
pub struct RetentionArgs {
	#[arg(long)]
	pub from_date: NaiveDate,
	#[arg(long)]
	pub to_date: NaiveDate,
	#[arg(long)]
	pub retention_type: Option<RetentionType>,
	/// Event that places a user in a cohort
	#[arg(long)]
	pub born_event: Option<String>,
	/// Event that counts as returning
	#[arg(long)]
	pub event: Option<String>,
	#[arg(long)]
	pub born_where: Option<String>,
	#[arg(long = "where")]
	pub where_clause: Option<String>,
	/// Bucket size in days
	#[arg(long, conflicts_with = "unit")]
	pub interval: Option<u32>,
	#[arg(long)]
	pub interval_count: Option<u32>,
	#[arg(long)]
	pub unit: Option<Unit>,
	#[arg(long)]
	pub on: Option<String>,
	#[arg(long)]
	pub limit: Option<u32>,
}

impl RetentionArgs {
	fn to_query(&self) -> RetentionQuery {
		RetentionQuery {
			from_date: self.from_date,
			to_date: self.to_date,
			retention_type: self.retention_type,
			born_event: self.born_event.clone(),
			event: self.event.clone(),
			born_where: self.born_where.clone(),
			where_clause: self.where_clause.clone(),
			interval: self.interval,
			interval_count: self.interval_count,
			unit: self.unit,
			on: self.on.clone(),
			limit: self.limit,
		}
	}
}

#[derive(ClapArgs, Debug)]
pub struct EngageArgs {
	#[arg(long = "where")]
	pub where_clause: Option<String>,
	#[arg(long)]
	pub distinct_id: Option<String>,
	/// Only return these profile properties (repeatable)
	#[arg(long = "property")]
	pub output_properties: Vec<String>,
	/// Fetch every page instead of just the first
	#[arg(long)]
	pub all: bool,
	/// Maximum pages in flight with --all
	#[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
	pub concurrency: usize,
	/// Continue an earlier session
	#[arg(long, requires = "page", conflicts_with = "all")]
	pub session_id: Option<String>,
	#[arg(long, requires = "session_id")]
	pub page: Option<u32>,
}

impl EngageArgs {
	pub fn to_query(&self) -> EngageQuery {
		EngageQuery {
			where_clause: self.where_clause.clone(),
			session_id: self.session_id.clone(),
			page: self.page,
			distinct_id: self.distinct_id.clone(),
			output_properties: self.output_properties.clone(),
		}
	}
}

impl Command {
	/// The single request this command maps to.
	pub fn to_query(&self) -> Box<dyn Query> {
		match self {
			Command::Events {
				events,
				event_type,
				unit,
				interval,
			} => Box::new(EventsQuery::new(
				events.iter().cloned(),
				*event_type,
				*unit,
				*interval,
			)),
			Command::TopEvents { event_type, limit } => Box::new(TopEventsQuery {
				event_type: *event_type,
				limit: *limit,
			}),
			Command::EventNames { event_type, limit } => Box::new(EventNamesQuery {
				event_type: *event_type,
				limit: *limit,
			}),
			Command::EventProperties {
				event,
				name,
				values,
				event_type,
				unit,
				interval,
				limit,
			} => Box::new(EventPropertiesQuery {
				event: event.clone(),
				name: name.clone(),
				values: values.clone(),
				event_type: *event_type,
				unit: *unit,
				interval: *interval,
				limit: *limit,
			}),
			Command::TopProperties { event, limit } => Box::new(TopEventPropertiesQuery {
				event: event.clone(),
				limit: *limit,
			}),
			Command::PropertyValues {
				event,
				name,
				limit,
				bucket,
			} => Box::new(EventPropertyValuesQuery {
				event: event.clone(),
				name: name.clone(),
				limit: *limit,
				bucket: bucket.clone(),
			}),
			Command::Funnel {
				funnel_id,
				from_date,
				to_date,
				length,
				interval,
				unit,
				on,
				where_clause,
				limit,
			} => Box::new(FunnelQuery {
				funnel_id: *funnel_id,
				from_date: *from_date,
				to_date: *to_date,
				length: *length,
				interval: *interval,
				unit: *unit,
				on: on.clone(),
				where_clause: where_clause.clone(),
				limit: *limit,
			}),
			Command::Funnels => Box::new(FunnelListQuery),
			Command::Segmentation(args) => Box::new(args.to_query()),
			Command::Retention(args) => Box::new(args.to_query()),
			Command::Engage(args) => Box::new(args.to_query()),
			Command::Export {
				from_date,
				to_date,
				events,
				where_clause,
				limit,
			} => Box::new(ExportQuery {
				from_date: *from_date,
				to_date: *to_date,
				events: events.clone(),
				where_clause: where_clause.clone(),
				limit: *limit,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;
	use mpq_query::ApiBase;

	fn parse(args: &[&str]) -> Args {
		Args::try_parse_from(args).unwrap()
	}

	#[test]
	fn test_cli_definition_is_valid() {
		Args::command().debug_assert();
	}

	#[test]
	fn test_events_command() {
		let args = parse(&[
			"mpq", "events", "signup", "login", "--type", "unique", "--unit", "hour", "--interval",
			"24",
		]);
		let query = args.command.to_query();
		assert_eq!(query.endpoint(), "events");

		let params = query.to_params().unwrap();
		assert_eq!(params.get("event").unwrap().to_wire(), r#"["signup","login"]"#);
		assert_eq!(params.get("unit").unwrap().to_wire(), "hour");
		assert_eq!(params.get("interval").unwrap().to_wire(), "24");
		assert_eq!(params.get("type").unwrap().to_wire(), "unique");
	}

	#[test]
	fn test_invalid_unit_rejected_by_parser() {
		assert!(Args::try_parse_from(["mpq", "events", "signup", "--unit", "decade"]).is_err());
	}

	#[test]
	fn test_global_options() {
		let args = parse(&[
			"mpq",
			"--auth",
			"secret",
			"--timeout-secs",
			"30",
			"funnels",
			"--format",
			"csv",
		]);
		assert_eq!(args.format, ResponseFormat::Csv);
		let overrides = CliOverrides::from(&args);
		assert_eq!(overrides.auth, Some(AuthKind::Secret));
		assert_eq!(overrides.timeout_secs, Some(30));
		assert_eq!(args.command.to_query().endpoint(), "funnels/list");
	}

	#[test]
	fn test_segmentation_kinds() {
		let args = parse(&[
			"mpq",
			"segmentation",
			"purchase",
			"--from-date",
			"2024-01-01",
			"--to-date",
			"2024-01-31",
			"--kind",
			"numeric",
			"--on",
			"properties[\"amount\"]",
			"--buckets",
			"4",
		]);
		let query = args.command.to_query();
		assert_eq!(query.endpoint(), "segmentation/numeric");
		assert_eq!(query.to_params().unwrap().get("buckets").unwrap().to_wire(), "4");
	}

	#[test]
	fn test_funnel_dates_go_together() {
		assert!(Args::try_parse_from(["mpq", "funnel", "7", "--from-date", "2024-01-01"]).is_err());
		let args = parse(&[
			"mpq",
			"funnel",
			"7",
			"--from-date",
			"2024-01-01",
			"--to-date",
			"2024-01-31",
		]);
		let params = args.command.to_query().to_params().unwrap();
		assert_eq!(params.get("funnel_id").unwrap().to_wire(), "7");
	}

	#[test]
	fn test_export_targets_data_api() {
		let args = parse(&[
			"mpq",
			"export",
			"--from-date",
			"2024-01-01",
			"--to-date",
			"2024-01-02",
			"--event",
			"signup",
		]);
		assert_eq!(args.command.to_query().base(), ApiBase::Data);
	}

	#[test]
	fn test_engage_all() {
		let args = parse(&["mpq", "engage", "--all", "--concurrency", "5", "--property", "$email"]);
		match args.command {
			Command::Engage(engage) => {
				assert!(engage.all);
				assert_eq!(engage.concurrency, 5);
				assert_eq!(engage.to_query().output_properties, vec!["$email".to_string()]);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
