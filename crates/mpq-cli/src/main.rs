// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! mpq - Mixpanel Data Export API from the command line
//!
//! Each subcommand sends one query and prints the response to stdout as
//! pretty JSON, or as the raw body with `--format csv`. Logs go to stderr.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mpq_query::{ConcurrentPaginator, ExportQuery, MixpanelQueryClient, ResponseFormat};

mod cli;
mod config;

use cli::{Args, Command, EngageArgs};
use config::{CliOverrides, FileConfig, DEFAULT_LOG_LEVEL};

/// Default filter directive for the binary and the query library.
fn log_filter(level: &str) -> String {
	format!("mpq={level},mpq_query={level}")
}

fn init_tracing(level: &str, json: bool) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(level)));

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(io::stderr))
			.init();
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let config_path = match &args.config {
		Some(path) => path.clone(),
		None => config::default_config_path().context("failed to locate config file")?,
	};
	let file = FileConfig::load(&config_path).context("failed to load config file")?;

	let log_level = args
		.log_level
		.as_deref()
		.or(file.log_level.as_deref())
		.unwrap_or(DEFAULT_LOG_LEVEL);
	init_tracing(log_level, args.log_json);
	debug!(path = %config_path.display(), found = config_path.exists(), "config file");

	let query_config = config::resolve(
		&CliOverrides::from(&args),
		|name| std::env::var(name).ok(),
		&file,
	)
	.context("invalid configuration")?;

	let client =
		MixpanelQueryClient::from_config(&query_config).context("failed to create client")?;

	info!(command = ?args.command, "running query");

	match &args.command {
		Command::Engage(engage) if engage.all => run_engage_all(&client, engage, args.format).await,
		Command::Export {
			from_date,
			to_date,
			events,
			where_clause,
			limit,
		} => {
			let query = ExportQuery {
				from_date: *from_date,
				to_date: *to_date,
				events: events.clone(),
				where_clause: where_clause.clone(),
				limit: *limit,
			};
			run_export(&client, &query, args.format).await
		}
		command => {
			let query = command.to_query();
			match args.format {
				ResponseFormat::Json => {
					let value = client.query(&*query).await?;
					print_json(&value)
				}
				ResponseFormat::Csv => {
					let body = client.query_raw(&*query, ResponseFormat::Csv).await?;
					let mut stdout = io::stdout().lock();
					stdout.write_all(body.as_bytes())?;
					stdout.flush()?;
					Ok(())
				}
			}
		}
	}
}

async fn run_engage_all(
	client: &MixpanelQueryClient,
	engage: &EngageArgs,
	format: ResponseFormat,
) -> Result<()> {
	if format != ResponseFormat::Json {
		bail!("engage --all only supports JSON output");
	}

	let paginator = ConcurrentPaginator::new(client.clone()).with_concurrency(engage.concurrency);
	let profiles = paginator
		.fetch_all(&engage.to_query())
		.await
		.context("failed to fetch profiles")?;

	debug!(count = profiles.len(), "fetched profiles");
	print_json(&serde_json::Value::Array(profiles))
}

async fn run_export(
	client: &MixpanelQueryClient,
	query: &ExportQuery,
	format: ResponseFormat,
) -> Result<()> {
	if format != ResponseFormat::Json {
		bail!("export only supports JSON lines output");
	}

	let events = client.export(query).await.context("export failed")?;

	let mut stdout = io::stdout().lock();
	for event in &events {
		serde_json::to_writer(&mut stdout, event)?;
		stdout.write_all(b"\n")?;
	}
	stdout.flush()?;
	Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
	let mut stdout = io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, value)?;
	stdout.write_all(b"\n")?;
	stdout.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_filter_targets_binary_and_library() {
		let filter = log_filter("debug");
		assert_eq!(filter, "mpq=debug,mpq_query=debug");
		assert!(EnvFilter::try_new(&filter).is_ok());
	}
}
