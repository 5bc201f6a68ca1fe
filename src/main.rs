//! CLI entry point for the FIRMS watch tool.
//!
//! Provides subcommands for a one-shot area summary, a cached refresh loop,
//! and offline analysis of an already-downloaded detection CSV.

use anyhow::Result;
use clap::{Parser, Subcommand};
use firms_watch::cache::{DEFAULT_TTL_SECS, FetchCache};
use firms_watch::errors::FirmsWatchError;
use firms_watch::fetch::{AreaQuery, BasicClient, fetch_csv};
use firms_watch::output::{append_record, print_json, write_table};
use firms_watch::parser::{DayNight, HotspotRecord, parse_hotspots};
use firms_watch::stats::{HotspotStats, filter_records};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_BASE_URL: &str = "https://firms.modaps.eosdis.nasa.gov/api/area/csv";
const DEFAULT_SOURCE: &str = "VIIRS_SNPP_NRT";
const DEFAULT_AREA: &str = "world";

#[derive(Parser)]
#[command(name = "firms_watch")]
#[command(about = "Fetch and summarize NASA FIRMS thermal-anomaly detections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the configured area once and print the aggregate snapshot
    Summary {
        /// Satellite source feed, e.g. VIIRS_SNPP_NRT or VIIRS_NOAA20_NRT
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        source: String,

        /// Area of interest: "world" or a west,south,east,north box
        #[arg(short, long, default_value = DEFAULT_AREA)]
        area: String,

        /// How many days back to query (the feed serves 1-10)
        #[arg(short, long, default_value_t = 1)]
        days: u32,

        /// Keep only detections with at least this FRP (MW)
        #[arg(long)]
        min_frp: Option<f64>,

        /// Keep only day (D) or night (N) detections
        #[arg(long, value_parser = parse_daynight)]
        daynight: Option<DayNight>,

        /// CSV file to append the snapshot to
        #[arg(short, long)]
        output: Option<String>,

        /// Write the normalized record table to this CSV file
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Refresh the snapshot on an interval through the TTL cache
    Watch {
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        source: String,

        #[arg(short, long, default_value = DEFAULT_AREA)]
        area: String,

        #[arg(short, long, default_value_t = 1)]
        days: u32,

        /// Keep only detections with at least this FRP (MW)
        #[arg(long)]
        min_frp: Option<f64>,

        /// Keep only day (D) or night (N) detections
        #[arg(long, value_parser = parse_daynight)]
        daynight: Option<DayNight>,

        /// Seconds between refreshes
        #[arg(short = 'r', long, default_value_t = 300)]
        interval: u64,

        /// Number of refreshes to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        count: usize,

        /// Cache TTL in seconds; refreshes inside the window reuse the
        /// previous fetch instead of calling the network
        #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
        ttl: u64,

        /// CSV file to append per-refresh snapshots to
        #[arg(short, long, default_value = "stats.csv")]
        output: String,

        /// Rewrite the normalized record table here on each refresh
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Summarize an already-downloaded detection CSV from a file or URL
    Analyze {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to append results to
        #[arg(short, long, default_value = "data.csv")]
        output: String,
    },
}

fn parse_daynight(raw: &str) -> std::result::Result<DayNight, String> {
    DayNight::parse(raw).ok_or_else(|| format!("expected D or N, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/firms_watch.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("firms_watch.log"));

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
        Commands::Summary {
            source,
            area,
            days,
            min_frp,
            daynight,
            output,
            table,
        } => {
            let query = AreaQuery::new(&map_key(), &source, &area, days)?;
            let client = BasicClient::new();

            let result = match fetch_csv(&client, &query.url(&base_url())).await {
                Ok(bytes) => parse_hotspots(&bytes),
                Err(e) => Err(e),
            };
            render_refresh(
                result,
                &source,
                &area,
                min_frp,
                daynight,
                output.as_deref(),
                table.as_deref(),
            )?;
        }
        Commands::Watch {
            source,
            area,
            days,
            min_frp,
            daynight,
            interval,
            count,
            ttl,
            output,
            table,
        } => {
            watch(
                &source, &area, days, min_frp, daynight, interval, count, ttl, &output,
                table.as_deref(),
            )
            .await?;
        }
        Commands::Analyze { source, output } => {
            let bytes = fetcher(&source).await?;
            let records = parse_hotspots(&bytes)?;
            let stats = HotspotStats::from_records(&records);

            print_json(&stats)?;
            append_record(&output, &stats)?;
        }
    }

    Ok(())
}

fn map_key() -> String {
    std::env::var("FIRMS_MAP_KEY").expect("FIRMS_MAP_KEY must be set")
}

fn base_url() -> String {
    std::env::var("FIRMS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Loads detection data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
async fn fetcher(source: &String) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_csv(&client, source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}

/// Turns one refresh outcome into operator-visible output. A failed refresh
/// degrades to an empty snapshot with the error attached; it never aborts
/// the process.
fn render_refresh(
    result: std::result::Result<Vec<HotspotRecord>, FirmsWatchError>,
    source: &str,
    area: &str,
    min_frp: Option<f64>,
    daynight: Option<DayNight>,
    output: Option<&str>,
    table: Option<&str>,
) -> Result<()> {
    match result {
        Ok(records) => {
            let visible = filter_records(&records, min_frp, daynight);
            info!(
                total = records.len(),
                shown = visible.len(),
                "Detections fetched"
            );

            let stats = HotspotStats::from_records(&visible).with_query_info(source, area);
            print_json(&stats)?;

            if let Some(path) = output {
                append_record(path, &stats)?;
            }
            if let Some(path) = table {
                write_table(path, &visible)?;
            }
        }
        Err(e) => {
            warn!(error = %e, "Refresh failed, rendering empty snapshot");

            let stats =
                HotspotStats::from_error(e.kind(), &e.to_string()).with_query_info(source, area);
            print_json(&stats)?;

            if let Some(path) = output {
                append_record(path, &stats)?;
            }
        }
    }
    Ok(())
}

/// Runs the cached refresh loop: one snapshot per tick, at most one network
/// call per TTL window per query.
#[tracing::instrument(skip(output, table), fields(source, area, interval, count, ttl))]
async fn watch(
    source: &str,
    area: &str,
    days: u32,
    min_frp: Option<f64>,
    daynight: Option<DayNight>,
    interval: u64,
    count: usize,
    ttl: u64,
    output: &str,
    table: Option<&str>,
) -> Result<()> {
    let query = AreaQuery::new(&map_key(), source, area, days)?;
    let client = BasicClient::new();
    let mut cache = FetchCache::new(ttl);

    if count == 0 {
        info!(interval, "Refreshing indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(count, interval, "Starting refresh loop");
    }

    let mut refresh_count = 0;

    loop {
        if count > 0 && refresh_count >= count {
            break;
        }

        refresh_count += 1;

        info!(
            refresh = refresh_count,
            total = if count == 0 { None } else { Some(count) },
            "Starting refresh"
        );

        let result = cache.get_or_fetch(&client, &base_url(), &query).await;
        render_refresh(
            result,
            source,
            area,
            min_frp,
            daynight,
            Some(output),
            table,
        )?;

        if count == 0 || refresh_count < count {
            info!(interval, "Waiting before next refresh");
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!(output, "Finished refresh loop");
    Ok(())
}
