//! CLI entry point for the stay tracker.
//!
//! Provides subcommands for one-shot aggregation of a booking batch and for
//! the full bootstrap-then-stream pipeline that maintains the running
//! per-hotel state.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stay_tracker::{
    aggregate::aggregate_batch,
    output::{write_counts_csv, write_state_csv},
    source::{DirectorySource, read_records},
    store::StateStore,
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "stay_tracker")]
#[command(about = "A tool to track per-hotel stay-length statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a single booking batch into a per-hotel count table
    Aggregate {
        /// CSV file of booking records
        #[arg(value_name = "INPUT")]
        input: String,

        /// CSV file to write the count table to
        #[arg(short, long, default_value = "counts.csv")]
        output: String,

        /// Sum the children field and set the with_kids flag
        #[arg(short, long, default_value_t = false)]
        kids: bool,
    },
    /// Bootstrap from a historical batch, fold in all incremental batches,
    /// and write the final state
    Run {
        /// CSV file with the historical batch
        #[arg(long)]
        historical: String,

        /// Directory of incremental batch CSVs, replayed in filename order
        #[arg(long)]
        stream_dir: String,

        /// CSV file to write the final state table to
        #[arg(short, long, default_value = "state.csv")]
        output: String,

        /// Records per parallel aggregation chunk during bootstrap
        #[arg(long, default_value_t = 10_000)]
        chunk_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/stay_tracker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("stay_tracker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            input,
            output,
            kids,
        } => {
            let records = read_records(Path::new(&input))?;
            info!(input, records = records.len(), "Batch loaded");

            let partials = aggregate_batch(&records, kids);
            write_counts_csv(&output, &partials)?;
        }
        Commands::Run {
            historical,
            stream_dir,
            output,
            chunk_size,
        } => {
            run_pipeline(&historical, &stream_dir, &output, chunk_size).await?;
        }
    }

    Ok(())
}

/// Bootstraps the store from the historical batch, folds in every currently
/// available incremental batch, then hands the final state to the sink.
#[tracing::instrument(fields(historical, stream_dir, output, chunk_size))]
async fn run_pipeline(
    historical: &str,
    stream_dir: &str,
    output: &str,
    chunk_size: usize,
) -> Result<()> {
    let mut store = StateStore::new();

    let records = read_records(Path::new(historical))?;
    info!(historical, records = records.len(), "Historical batch loaded");
    store.bootstrap(records, chunk_size).await?;

    let mut source = DirectorySource::open(stream_dir)?;
    store.run_stream(&mut source).await?;

    write_state_csv(output, &store)?;
    info!(output, hotels = store.len(), "Final state persisted");
    Ok(())
}
