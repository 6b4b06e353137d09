//! Water Level - river water-level monitoring dashboard
//!
//! Entry point: runs the web dashboard or one-shot statistics, export and
//! recording commands against the configured realtime database.

use anyhow::{Context, Result};
use clap::{crate_description, crate_name, crate_version, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use water_level::config::AppConfig;
use water_level::export;
use water_level::stats::distribution;
use water_level::stats::engine::{self, round_to};
use water_level::{Granularity, Recorder, WindowLoader, WindowSource};
use water_level_server::AppState;

/// Parse a number of seconds into a Duration
fn parse_secs(arg: &str) -> Result<Duration, String> {
    match arg.parse::<f64>() {
        Ok(secs) if secs > 0.0 => Ok(Duration::from_millis((secs * 1000.0).round() as u64)),
        _ => Err(format!("Invalid time value: {arg}")),
    }
}

#[derive(Parser, Debug)]
#[command(name = crate_name!(), version = crate_version!(), about = crate_description!())]
struct Cli {
    #[arg(
        long,
        short = 'c',
        value_name = "FILE",
        global = true,
        help = "Config file (default: <config_dir>/water-level/config.json)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "URL",
        global = true,
        help = "Realtime database URL, overrides the config file"
    )]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web dashboard
    Serve {
        #[arg(long, short = 'p', help = "Port to listen on")]
        port: Option<u16>,

        #[arg(long, value_name = "ADDR", help = "Address to bind")]
        bind: Option<String>,
    },
    /// Print statistics and predictions for a range
    Stats {
        #[arg(long, short = 'r', default_value = "daily", help = "daily, weekly or monthly")]
        range: Granularity,

        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
    /// Export a range as CSV
    Export {
        #[arg(long, short = 'r', default_value = "daily", help = "daily, weekly or monthly")]
        range: Granularity,

        #[arg(long, short = 'o', value_name = "FILE", help = "Output file (default: water-level-data-<date>.csv)")]
        output: Option<PathBuf>,
    },
    /// Record the live reading until Ctrl+C
    Record {
        #[arg(long, short = 'I', value_name = "SECS", value_parser = parse_secs, help = "Poll interval (default from config)")]
        interval: Option<Duration>,

        #[arg(long, short = 'o', value_name = "FILE", help = "Output file (default: water-level-recording-<ms>.csv)")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("water_level=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(url) = cli.database_url {
        config.database_url = Some(url);
    }

    match cli.command {
        Command::Serve { port, bind } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(&config).await
        }
        Command::Stats { range, json } => stats(&config, range, json).await,
        Command::Export { range, output } => export_range(&config, range, output).await,
        Command::Record { interval, output } => record(&config, interval, output).await,
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    info!(version = water_level::VERSION, "Starting water level dashboard");
    let store = config.open_store()?;
    let state = AppState::new(store, config.server_config());
    water_level_server::start_server(state).await
}

async fn stats(config: &AppConfig, range: Granularity, json: bool) -> Result<()> {
    let store = config.open_store()?;
    let live = store.fetch_current().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Live reading unavailable, using defaults");
        None
    });
    let outcome = WindowLoader::new(store.as_ref()).load(range, live).await;
    let live = water_level::LiveReading::or_default(live);
    let samples = outcome.window.samples();
    let statistics = engine::compute(samples, live);
    let bins = distribution::bin(samples);

    if json {
        let report = serde_json::json!({
            "range": range,
            "source": outcome.source,
            "diagnostic": outcome.diagnostic,
            "sample_count": samples.len(),
            "statistics": statistics.rounded(),
            "alerts": statistics.alerts,
            "distribution": bins.counts,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let rounded = statistics.rounded();
    println!("Range:          {} ({})", range.label(), range);
    println!(
        "Source:         {}",
        match outcome.source {
            WindowSource::Store => "database",
            WindowSource::Synthetic => "synthetic",
        }
    );
    if let Some(diagnostic) = &outcome.diagnostic {
        println!("Warning:        {diagnostic}");
    }
    println!("Samples:        {}", samples.len());
    println!("Average:        {:.2} m", rounded.average);
    println!("Maximum:        {:.2} m", rounded.max);
    println!("Minimum:        {:.2} m", rounded.min);
    println!("Std deviation:  {:.2} m", rounded.standard_deviation);
    println!("Rate of change: {:.4} m/s", rounded.rate_of_change);
    println!();
    println!("Predictions:");
    for (hours, height) in statistics.predictions.by_horizon() {
        println!(
            "  +{hours}h  {:.2} m  ({:+.2} m)",
            height,
            round_to(height - live.height, 2)
        );
    }
    println!();
    println!("Distribution:");
    for (label, count) in water_level::DistributionBins::labels()
        .iter()
        .zip(bins.counts.iter())
    {
        println!("  {label:>8}  {count}");
    }
    for alert in &statistics.alerts {
        println!();
        println!("[{:?}] {}", alert.level, alert.message);
    }
    Ok(())
}

async fn export_range(config: &AppConfig, range: Granularity, output: Option<PathBuf>) -> Result<()> {
    let store = config.open_store()?;
    let live = store.fetch_current().await.ok().flatten();
    let outcome = WindowLoader::new(store.as_ref()).load(range, live).await;
    if let Some(diagnostic) = &outcome.diagnostic {
        tracing::warn!(%diagnostic, "Exporting synthetic data");
    }

    let offset = config.offset();
    let path = output.unwrap_or_else(|| PathBuf::from(export::filename_today(offset)));
    let csv = export::to_csv(outcome.window.samples(), offset);
    std::fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), samples = outcome.window.len(), "Export written");
    Ok(())
}

async fn record(config: &AppConfig, interval: Option<Duration>, output: Option<PathBuf>) -> Result<()> {
    let store = config.open_store()?;
    let interval = interval.unwrap_or_else(|| config.recording_interval());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl+C handler")?;

    let handle = Recorder::new(interval).start(store);
    println!("Recording every {:.1}s. Press Ctrl+C to stop.", interval.as_secs_f64());

    let mut last_count = 0;
    while running.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let count = handle.samples_recorded();
        if count != last_count {
            info!(samples = count, "Recording");
            last_count = count;
        }
    }

    let recording = handle.stop();
    let path = output.unwrap_or_else(|| PathBuf::from(recording.filename()));
    std::fs::write(&path, recording.to_csv(config.offset()))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {} samples to {}", recording.samples.len(), path.display());
    Ok(())
}
