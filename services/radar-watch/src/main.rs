//! radar-watch
//!
//! Keeps the newest radar volume for a station in view.
//!
//! This service:
//! - Polls the archive bucket for the station's newest volume
//! - Skips metadata-only objects
//! - Publishes the newest reference to a shared cell
//! - Redraws whatever the cell holds on an independent render timer

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use radar_watch::config::Config;
use radar_watch::{
    run_render_loop, FreshnessPoller, KeyResolver, LatestReferenceCell, LoggingRenderSink,
    PollOutcome, S3Directory, TimeoutDirectory,
};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to RADAR_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting radar-watch");
    info!(
        station = %config.station,
        bucket = %config.bucket,
        region = %config.region,
        poll_interval_secs = config.poll_interval.as_secs(),
        render_interval_ms = config.render_interval.as_millis() as u64,
        once = config.once,
        "Configuration loaded"
    );

    let directory = TimeoutDirectory::new(
        S3Directory::anonymous(&config.region).await,
        config.list_timeout,
    );
    let resolver =
        KeyResolver::new(directory, config.bucket.clone()).with_marker(config.marker.clone());
    let cell = Arc::new(LatestReferenceCell::new());
    let mut poller = FreshnessPoller::new(
        resolver,
        config.station.clone(),
        Arc::clone(&cell),
        config.poll_interval,
    );

    if config.once {
        return match poller.poll_once(Utc::now()).await {
            PollOutcome::Skipped { error } => Err(error.into()),
            PollOutcome::Updated { reference, .. } | PollOutcome::Unchanged { reference } => {
                info!(reference = %reference, "Latest radar data S3 URL");
                Ok(())
            }
        };
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller_handle = tokio::spawn(poller.run(shutdown_rx.clone()));
    let render_handle = tokio::spawn(run_render_loop(
        Arc::clone(&cell),
        LoggingRenderSink,
        config.render_interval,
        shutdown_rx,
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = poller_handle => {
            if let Err(e) = result {
                error!(error = %e, "Freshness poller task panicked");
            }
        }
        result = render_handle => {
            if let Err(e) = result {
                error!(error = %e, "Render task panicked");
            }
        }
    }

    // Nothing to flush; the cell is always consistent.
    let _ = shutdown_tx.send(true);

    info!("radar-watch shutdown complete");
    Ok(())
}
