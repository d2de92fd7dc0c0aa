//! Render loop.
//!
//! Reads the latest-reference cell on its own timer and hands whatever it
//! holds to a [`RenderSink`]. Fetching, decoding and drawing the payload are
//! the sink's business. An empty cell means there is nothing to draw yet; the
//! same reference is redrawn on every tick until the poller replaces it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use radar_object_keys::ObjectReference;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cell::SharedReferenceCell;

/// Consumer of the latest object reference.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Render the object behind `reference`.
    async fn render(&self, reference: &ObjectReference) -> Result<()>;
}

#[async_trait]
impl<S: RenderSink + ?Sized> RenderSink for Arc<S> {
    async fn render(&self, reference: &ObjectReference) -> Result<()> {
        (**self).render(reference).await
    }
}

/// Sink that only logs what would be rendered.
#[derive(Debug, Default)]
pub struct LoggingRenderSink;

#[async_trait]
impl RenderSink for LoggingRenderSink {
    async fn render(&self, reference: &ObjectReference) -> Result<()> {
        info!(
            reference = %reference,
            url = %reference.https_url(),
            "Rendering latest radar volume"
        );
        Ok(())
    }
}

/// Render the cell contents every `interval` until shutdown.
pub async fn run_render_loop<S: RenderSink>(
    cell: SharedReferenceCell,
    sink: S,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Starting render loop"
    );

    let mut interval_timer = tokio::time::interval(interval);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval_timer.tick() => {
                let Some(reference) = cell.get() else {
                    debug!("No radar data available yet");
                    continue;
                };

                if let Err(e) = sink.render(&reference).await {
                    warn!(reference = %reference, error = %e, "Error displaying radar data");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Render loop shutting down");
                    break;
                }
            }
        }
    }
}
