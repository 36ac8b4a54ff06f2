//! costsplit-check - command-line cost split validation
//!
//! Validates an employee's date-effective cost split file, optionally with
//! one added or edited allocation merged in, and prints the verdict. Exits
//! non-zero when the set is rejected.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use costsplit_check::{check, CheckRequest};
use costsplit_common::config::load_config;
use costsplit_common::dates::parse_date;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for costsplit-check
#[derive(Parser, Debug)]
#[command(name = "costsplit-check")]
#[command(about = "Validate date-effective cost split allocations")]
#[command(version)]
struct Args {
    /// JSON file with the current allocations
    allocations: PathBuf,

    /// JSON file with one allocation to add, or to replace the one with the same id
    #[arg(short, long)]
    incoming: Option<PathBuf>,

    /// Summarise the allocations in effect on this day
    #[arg(long, value_parser = parse_day)]
    on: Option<NaiveDate>,

    /// JSON object mapping cost code ids to display codes
    #[arg(long)]
    codes: Option<PathBuf>,

    /// TOML configuration file (falls back to $COSTSPLIT_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_day(text: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(text).ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", text))
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let (config, source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG overrides the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting costsplit-check v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log();
    info!(
        "Validation limit {}% (tolerance {})",
        config.validation.max_total_percentage, config.validation.epsilon
    );

    let request = CheckRequest {
        allocations: args.allocations,
        incoming: args.incoming,
        codes: args.codes,
        on: args.on,
    };

    let report = check(&request, &config.validation)?;
    print!("{}", report.render());

    Ok(if report.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
