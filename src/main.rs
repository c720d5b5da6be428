//! CLI entry point for the political donors tool.
//!
//! Reads an FEC individual contributions file and writes the running
//! by-zip report and the final by-date report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use political_donors::aggregators::{BatchGroupAggregator, StreamingGroupAggregator};
use political_donors::input::{create_output, open_input};
use political_donors::output::{print_json, print_pretty};
use political_donors::pipeline::{DonorPipeline, RecordHandler, RunSummary};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "political_donors")]
#[command(about = "Median, count and total of political contributions by zip code and date", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the by-zip and by-date reports for a contributions file
    Process {
        /// Pipe-delimited contributions file (`-` for stdin, `.gz` accepted)
        #[arg(value_name = "INPUT")]
        input: String,

        /// Running median report by recipient and zip code (`-` for stdout)
        #[arg(value_name = "BY_ZIP_OUTPUT")]
        by_zip_output: String,

        /// Final median report by recipient and date (`-` for stdout)
        #[arg(value_name = "BY_DATE_OUTPUT")]
        by_date_output: String,
    },
    /// Validate a contributions file and report row counts without writing reports
    Check {
        /// Pipe-delimited contributions file (`-` for stdin, `.gz` accepted)
        #[arg(value_name = "INPUT")]
        input: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/political_donors.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("political_donors.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::Process {
            input,
            by_zip_output,
            by_date_output,
        } => process(&input, &by_zip_output, &by_date_output)?,
        Commands::Check { input } => check(&input)?,
    };

    print_pretty(&summary);
    print_json(&summary)?;

    Ok(())
}

/// Runs both aggregators over `input` and writes their reports.
#[tracing::instrument]
fn process(input: &str, by_zip_output: &str, by_date_output: &str) -> Result<RunSummary> {
    let reader = open_input(input)?;
    let mut by_zip = StreamingGroupAggregator::new(create_output(by_zip_output)?);
    let mut by_date = BatchGroupAggregator::new(create_output(by_date_output)?);

    let handlers: Vec<&mut dyn RecordHandler> = vec![&mut by_zip, &mut by_date];
    let summary = DonorPipeline::new(handlers)
        .process(reader)
        .with_context(|| format!("failed to process '{input}'"))?;

    by_zip.into_inner()?.flush()?;
    by_date.into_inner()?.flush()?;

    info!(by_zip_output, by_date_output, "Reports written");
    Ok(summary)
}

/// Runs the full pipeline with both reports discarded.
#[tracing::instrument]
fn check(input: &str) -> Result<RunSummary> {
    let reader = open_input(input)?;
    let mut by_zip = StreamingGroupAggregator::new(std::io::sink());
    let mut by_date = BatchGroupAggregator::new(std::io::sink());

    let handlers: Vec<&mut dyn RecordHandler> = vec![&mut by_zip, &mut by_date];
    let summary = DonorPipeline::new(handlers)
        .process(reader)
        .with_context(|| format!("failed to check '{input}'"))?;

    info!(rows_read = summary.rows_read, "Input is well formed");
    Ok(summary)
}
