//! CLI for the lookback query-time sample streams.
//!
//! Provides commands for merging partitioned fixture files and inspecting
//! look-back windows of their series.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lookback::buffer::BufferedSeriesIterator;
use lookback::config::BufferConfig;
use lookback::fixture::{self, SeriesFixture};
use lookback::iterator::SeriesIterator;
use lookback::merge::merge_partitions;
use lookback::sample::Sample;
use lookback::series::{Series, SeriesSet};

/// lookback - Merge partitioned series and inspect look-back windows.
#[derive(Parser)]
#[command(name = "lookback", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Merge fixture files, one per time partition, into a single series set.
    Merge {
        /// Fixture files, ordered from the oldest partition to the newest.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Show the look-back window of every series in a fixture file.
    Window {
        /// Fixture file to read.
        file: PathBuf,

        /// Look-back window width, in timestamp units.
        #[arg(long)]
        delta: i64,

        /// Evaluation timestamps. Every sample is visited when none are given.
        #[arg(long = "at", allow_negative_numbers = true)]
        at: Vec<i64>,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },
}

/// Output format for command results.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array of objects.
    Json,
}

/// One evaluation step of the `window` command.
struct WindowRow {
    labels: String,
    at: Option<i64>,
    current: Sample,
    buffer: Vec<Sample>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge { files, format } => cmd_merge(&files, &format),
        Commands::Window {
            file,
            delta,
            at,
            format,
        } => cmd_window(&file, delta, at, &format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Implements `lookback merge <FILES>...`.
fn cmd_merge(files: &[PathBuf], format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut sets: Vec<Box<dyn SeriesSet>> = Vec::with_capacity(files.len());
    for path in files {
        debug!(path = %path.display(), "loading partition");
        sets.push(Box::new(fixture::load_file(path)?));
    }

    let mut merged = merge_partitions(sets);
    let mut out = Vec::new();
    for series in merged.by_ref() {
        out.push(SeriesFixture::from_series(series.as_ref())?);
    }
    if let Some(err) = merged.err() {
        return Err(err.clone().into());
    }

    match format {
        OutputFormat::Csv => {
            println!("labels,timestamp,value");
            for series in &out {
                let labels = csv_field(&series.labels.to_string());
                for s in &series.samples {
                    println!("{labels},{},{}", s.t, s.v);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

/// Implements `lookback window <FILE> --delta D [--at T]...`.
fn cmd_window(
    file: &Path,
    delta: i64,
    mut at: Vec<i64>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = BufferConfig::new(delta);
    config.validate()?;

    at.sort_unstable();
    at.dedup();

    let mut set = fixture::load_file(file)?;
    let mut rows = Vec::new();
    for series in set.by_ref() {
        let labels = series.labels().to_string();
        let mut it = BufferedSeriesIterator::with_config(series.iterator(), &config)?;

        if at.is_empty() {
            while it.next() {
                rows.push(window_row(&labels, None, &it));
            }
        } else {
            for &t in &at {
                if !it.seek(t) {
                    break;
                }
                rows.push(window_row(&labels, Some(t), &it));
            }
        }

        if let Some(err) = it.err() {
            return Err(err.clone().into());
        }
    }
    if let Some(err) = set.err() {
        return Err(err.clone().into());
    }

    match format {
        OutputFormat::Csv => {
            println!("labels,at,timestamp,value,buffer");
            for row in &rows {
                let at = row.at.map(|t| t.to_string()).unwrap_or_default();
                let buffer: Vec<String> = row
                    .buffer
                    .iter()
                    .map(|s| format!("{}:{}", s.t, s.v))
                    .collect();
                println!(
                    "{},{at},{},{},{}",
                    csv_field(&row.labels),
                    row.current.t,
                    row.current.v,
                    buffer.join(" ")
                );
            }
        }
        OutputFormat::Json => {
            let json_rows: Vec<_> = rows
                .iter()
                .map(|row| {
                    json!({
                        "labels": row.labels,
                        "at": row.at,
                        "current": row.current,
                        "buffer": row.buffer,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_rows)?);
        }
    }

    Ok(())
}

/// Captures the current sample and look-back window of `it`.
fn window_row<I: SeriesIterator>(
    labels: &str,
    at: Option<i64>,
    it: &BufferedSeriesIterator<I>,
) -> WindowRow {
    let mut buffer = Vec::new();
    let mut window = it.buffer();
    while window.next() {
        buffer.push(window.at());
    }
    WindowRow {
        labels: labels.to_string(),
        at,
        current: it.at(),
        buffer,
    }
}

/// Quotes a CSV field if it contains separators or quotes.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
