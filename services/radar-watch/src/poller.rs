//! Freshness poller.
//!
//! Resolves the newest object for the configured source on a fixed interval
//! and publishes it to the shared cell. The first cycle runs immediately.
//!
//! Failures never stop the loop: each one is logged with the prefix that was
//! searched and the cycle ends without touching the cell, so the last good
//! reference stays visible to the render loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use radar_object_keys::{ObjectReference, SourceId};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cell::{CellUpdate, SharedReferenceCell};
use crate::directory::ObjectDirectory;
use crate::resolver::{KeyResolver, ResolutionError};

/// Consecutive directory failures logged at `warn` before switching to `error`.
const QUIET_FAILURE_LIMIT: u32 = 3;

/// Poller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Shared view of a poller's state, readable while a cycle is in flight.
#[derive(Debug, Clone, Default)]
pub struct PollerStateHandle {
    polling: Arc<AtomicBool>,
}

impl PollerStateHandle {
    pub fn get(&self) -> PollerState {
        if self.polling.load(Ordering::Acquire) {
            PollerState::Polling
        } else {
            PollerState::Idle
        }
    }

    fn set(&self, state: PollerState) {
        self.polling
            .store(state == PollerState::Polling, Ordering::Release);
    }
}

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new reference was published.
    Updated {
        reference: ObjectReference,
        previous: Option<Arc<ObjectReference>>,
    },
    /// The newest reference is the one already published.
    Unchanged { reference: ObjectReference },
    /// Nothing was published this cycle.
    Skipped { error: ResolutionError },
}

impl PollOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Periodically resolves the latest object and stores it in the cell.
pub struct FreshnessPoller<D> {
    resolver: KeyResolver<D>,
    source: SourceId,
    cell: SharedReferenceCell,
    interval: Duration,
    state: PollerStateHandle,
    consecutive_failures: u32,
    directory_failures: u32,
}

impl<D: ObjectDirectory> FreshnessPoller<D> {
    pub fn new(
        resolver: KeyResolver<D>,
        source: SourceId,
        cell: SharedReferenceCell,
        interval: Duration,
    ) -> Self {
        Self {
            resolver,
            source,
            cell,
            interval,
            state: PollerStateHandle::default(),
            consecutive_failures: 0,
            directory_failures: 0,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state.get()
    }

    /// Handle for observing the state from another task.
    pub fn state_handle(&self) -> PollerStateHandle {
        self.state.clone()
    }

    /// Failed cycles in a row, of any kind.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Failed listings in a row. Empty or marker-only listings reset this.
    pub fn directory_failures(&self) -> u32 {
        self.directory_failures
    }

    /// Run one resolution as of `now` and apply the result to the cell.
    pub async fn poll_once(&mut self, now: DateTime<Utc>) -> PollOutcome {
        self.state.set(PollerState::Polling);
        debug!(source = %self.source, "Checking for new data");

        let result = self.resolver.resolve_latest(&self.source, now).await;
        self.state.set(PollerState::Idle);

        match result {
            Ok(reference) => {
                self.consecutive_failures = 0;
                self.directory_failures = 0;
                match self.cell.replace_if_changed(reference.clone()) {
                    CellUpdate::Unchanged => {
                        debug!(reference = %reference, "Latest reference unchanged");
                        PollOutcome::Unchanged { reference }
                    }
                    CellUpdate::Initialized => {
                        info!(reference = %reference, "Latest reference published");
                        PollOutcome::Updated {
                            reference,
                            previous: None,
                        }
                    }
                    CellUpdate::Replaced { previous } => {
                        info!(
                            reference = %reference,
                            previous = %previous,
                            "Latest reference updated"
                        );
                        PollOutcome::Updated {
                            reference,
                            previous: Some(previous),
                        }
                    }
                }
            }
            Err(e) => {
                self.consecutive_failures += 1;
                if e.is_expected() {
                    self.directory_failures = 0;
                } else {
                    self.directory_failures += 1;
                }
                self.log_failure(&e);
                PollOutcome::Skipped { error: e }
            }
        }
    }

    fn log_failure(&self, e: &ResolutionError) {
        let consecutive_failures = self.consecutive_failures;
        let directory_failures = self.directory_failures;
        match e {
            ResolutionError::NoFilesFound { prefix } => {
                info!(
                    source = %self.source,
                    prefix = %prefix,
                    consecutive_failures,
                    "No files found for station and date"
                );
            }
            ResolutionError::NoValidFile {
                prefix,
                key_count,
                marker_key,
            } => {
                info!(
                    source = %self.source,
                    prefix = %prefix,
                    key_count,
                    marker_key = %marker_key,
                    consecutive_failures,
                    "No valid radar data available"
                );
            }
            ResolutionError::Directory(err) if directory_failures <= QUIET_FAILURE_LIMIT => {
                warn!(
                    source = %self.source,
                    bucket = %self.resolver.bucket(),
                    prefix = %err.prefix(),
                    error = %err,
                    directory_failures,
                    "Listing failed; retrying next cycle"
                );
            }
            ResolutionError::Directory(err) => {
                error!(
                    source = %self.source,
                    bucket = %self.resolver.bucket(),
                    prefix = %err.prefix(),
                    error = %err,
                    directory_failures,
                    "Listing failed repeatedly; retrying next cycle"
                );
            }
        }
    }

    /// Poll until `shutdown` flips to true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            source = %self.source,
            bucket = %self.resolver.bucket(),
            interval_secs = self.interval.as_secs(),
            "Starting freshness poller"
        );

        let mut interval_timer = tokio::time::interval(self.interval);
        interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    self.poll_once(Utc::now()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Freshness poller shutting down");
                        break;
                    }
                }
            }
        }
    }
}
