use anyhow::anyhow;
use clap::Parser;
use quakewatch::aggregator::{Aggregator, HoursWindow, Source};
use quakewatch::config::Config;
use quakewatch::feeds::GeoPoint;
use quakewatch::monitor::{AlertMonitor, FixedLocation};
use quakewatch::notify::{ConsoleNotifier, Notifier};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "quakewatch")]
#[command(about = "Earthquake feed aggregator and proximity alert monitor", long_about = None)]
struct Args {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Feed source: usgs, afad or kandilli
    #[arg(long, default_value = "usgs")]
    source: String,

    /// Recency window in hours: 1, 3, 7 or 24
    #[arg(long, default_value = "24")]
    hours: String,

    /// Run the background alert monitor instead of a one-shot listing
    #[arg(long)]
    watch: bool,

    /// Observer latitude in degrees (required with --watch)
    #[arg(long)]
    lat: Option<f64>,

    /// Observer longitude in degrees (required with --watch)
    #[arg(long)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let verbosity = if args.verbose > 3 { 3 } else { args.verbose };
    Config::ensure_log_directory().ok();
    quakewatch::init_tracing(verbosity, Some(Config::log_file_path()));

    if args.watch {
        let position = match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => GeoPoint { lat, lon },
            _ => return Err(anyhow!("--watch requires --lat and --lon")),
        };
        run_watch(position).await
    } else {
        let source: Source = args.source.parse().map_err(|e: String| anyhow!(e))?;
        let window: HoursWindow = args.hours.parse().map_err(|e: String| anyhow!(e))?;
        run_list(source, window).await
    }
}

/// One-shot listing: load, print time-descending, surface the error message
/// with an empty listing on failure.
async fn run_list(source: Source, window: HoursWindow) -> anyhow::Result<()> {
    let mut aggregator = Aggregator::new();
    match aggregator.load(source, window).await {
        Ok(events) => {
            println!(
                "{} events from {} in the last {}h",
                events.len(),
                source.label(),
                window.hours()
            );
            for event in &events {
                println!(
                    "M{:<4.1} {}  {}",
                    event.magnitude,
                    event.time.format("%Y-%m-%d %H:%M UTC"),
                    event.place
                );
            }
            Ok(())
        }
        Err(message) => Err(anyhow!(message)),
    }
}

/// Run the alert monitor until interrupted. Restores a previously enabled
/// monitor without re-persisting; otherwise starts and persists the flag.
async fn run_watch(position: GeoPoint) -> anyhow::Result<()> {
    let notifier = Arc::new(ConsoleNotifier);
    if !notifier.request_authorization() {
        tracing::warn!("Notification authorization denied, alerts will be silent");
    }

    let monitor = AlertMonitor::new(Arc::new(FixedLocation(position)), notifier);
    monitor.restore();
    if !monitor.is_active() {
        monitor.start(true);
    }
    println!(
        "Watching for earthquakes near ({:.2}, {:.2}); Ctrl-C to exit.",
        position.lat, position.lon
    );

    tokio::signal::ctrl_c().await?;
    // Keep the persisted enabled flag so the next run restores the monitor.
    monitor.stop(false);
    Ok(())
}
