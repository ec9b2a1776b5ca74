//! Forecast model run inspector.
//!
//! Reads dataset inventory descriptions (YAML or JSON), builds the run
//! inventories they describe and prints a JSON summary of each run.

mod config;
mod manifest;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fmrc_inventory::{RunCollectionBuilder, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "fmrc-inspector")]
#[command(about = "Build forecast model run inventories from dataset descriptions")]
struct Args {
    /// Description files or directories to scan
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file path (default: FMRC_* environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print the run with this reference time (RFC 3339)
    #[arg(short, long)]
    run: Option<DateTime<Utc>>,

    /// Only print the latest run
    #[arg(long, conflicts_with = "run")]
    latest: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let config = config::load_config(args.config.as_deref())?;
    info!(
        parallel_runs = config.parallel_runs,
        worker_threads = ?config.worker_threads,
        "Loaded configuration"
    );

    let inventories = manifest::load_inventories(&args.inputs)?;
    if inventories.is_empty() {
        warn!("No dataset descriptions found");
    }

    let mut builder = RunCollectionBuilder::new(config);
    builder.add_all(inventories)?;
    let collection = builder.finalize()?;

    let summaries: Vec<RunSummary> = if let Some(run_date) = args.run {
        let run = collection
            .run(run_date)
            .with_context(|| format!("No run with reference time {}", run_date))?;
        vec![run.summary()]
    } else if args.latest {
        collection.latest().map(|run| run.summary()).into_iter().collect()
    } else {
        collection.summaries()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &summaries)?;
    } else {
        serde_json::to_writer(&mut out, &summaries)?;
    }
    writeln!(out)?;

    info!(runs = summaries.len(), "Done");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the summaries
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "fmrc-inspector",
            "runs/",
            "extra.yaml",
            "--run",
            "2024-01-15T00:00:00Z",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert!(args.run.is_some());
        assert!(args.pretty);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_run_and_latest_conflict() {
        let result = Args::try_parse_from([
            "fmrc-inspector",
            "runs/",
            "--run",
            "2024-01-15T00:00:00Z",
            "--latest",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inputs_required() {
        assert!(Args::try_parse_from(["fmrc-inspector"]).is_err());
    }
}
