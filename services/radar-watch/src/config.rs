//! Watcher configuration.
//!
//! Everything is read once from the environment at start-up; there is no
//! runtime reconfiguration.

use std::time::Duration;

use anyhow::{Context, Result};
use radar_object_keys::{Bucket, SourceId, MARKER_SUBSTRING};

/// Watcher configuration (env-driven).
#[derive(Debug, Clone)]
pub struct Config {
    /// Station to track (normalized).
    pub station: SourceId,

    /// Bucket holding the archive.
    pub bucket: Bucket,

    /// Region the bucket lives in.
    pub region: String,

    /// Time between freshness polls.
    pub poll_interval: Duration,

    /// Time between render ticks.
    pub render_interval: Duration,

    /// Upper bound on a single directory listing.
    pub list_timeout: Duration,

    /// Substring marking metadata-only objects.
    pub marker: String,

    /// Resolve once, report, and exit.
    pub once: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let station = SourceId::parse(
            &lookup("RADAR_STATION").unwrap_or_else(|| "KOKX".to_string()),
        )
        .context("RADAR_STATION must name a station.")?;

        let bucket = Bucket::parse(
            &lookup("RADAR_BUCKET").unwrap_or_else(|| "noaa-nexrad-level2".to_string()),
        )
        .context("RADAR_BUCKET must not be empty.")?;

        let region = lookup("RADAR_REGION").unwrap_or_else(|| "us-east-1".to_string());

        let poll_interval_secs: u64 = lookup("RADAR_POLL_INTERVAL_SECS")
            .map(|v| v.parse())
            .transpose()
            .context("RADAR_POLL_INTERVAL_SECS must be an integer (seconds).")?
            .unwrap_or(300);
        let poll_interval = Duration::from_secs(poll_interval_secs.max(1));

        let render_interval_ms: u64 = lookup("RADAR_RENDER_INTERVAL_MS")
            .map(|v| v.parse())
            .transpose()
            .context("RADAR_RENDER_INTERVAL_MS must be an integer (milliseconds).")?
            .unwrap_or(3000);
        let render_interval = Duration::from_millis(render_interval_ms.max(50));

        let list_timeout_secs: u64 = lookup("RADAR_LIST_TIMEOUT_SECS")
            .map(|v| v.parse())
            .transpose()
            .context("RADAR_LIST_TIMEOUT_SECS must be an integer (seconds).")?
            .unwrap_or(30);
        let list_timeout = Duration::from_secs(list_timeout_secs.max(1));

        let marker = lookup("RADAR_MARKER").unwrap_or_else(|| MARKER_SUBSTRING.to_string());

        let once = lookup("RADAR_POLL_ONCE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let log_level = lookup("RADAR_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            station,
            bucket,
            region,
            poll_interval,
            render_interval,
            list_timeout,
            marker,
            once,
            log_level,
        })
    }
}
