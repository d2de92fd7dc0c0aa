//! Latest-object resolution.
//!
//! Given a source and the current UTC time, the resolver lists the day's
//! partition and applies the selection policy from `radar-object-keys`.

use chrono::{DateTime, Utc};
use radar_object_keys::{
    select_latest, Bucket, KeyPrefix, ObjectReference, SelectError, SourceId, MARKER_SUBSTRING,
};
use thiserror::Error;
use tracing::debug;

use crate::directory::{DirectoryError, ObjectDirectory};

/// Why a resolution produced no reference.
///
/// None of these are fatal: the poller logs them and tries again next cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Nothing has been published under the prefix yet.
    #[error("no files found under {prefix}")]
    NoFilesFound { prefix: KeyPrefix },

    /// Only a marker-only object was available.
    #[error("no valid file under {prefix} ({key_count} keys, newest is marker-only {marker_key})")]
    NoValidFile {
        prefix: KeyPrefix,
        key_count: usize,
        marker_key: String,
    },

    /// The listing itself failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ResolutionError {
    /// Prefix that was searched, when the listing got that far.
    pub fn prefix(&self) -> Option<&KeyPrefix> {
        match self {
            Self::NoFilesFound { prefix } | Self::NoValidFile { prefix, .. } => Some(prefix),
            Self::Directory(_) => None,
        }
    }

    /// Returns true for the routine "nothing new yet" conditions.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Directory(_))
    }
}

/// Finds the newest valid object for a source.
pub struct KeyResolver<D> {
    directory: D,
    bucket: Bucket,
    marker: String,
}

impl<D: ObjectDirectory> KeyResolver<D> {
    pub fn new(directory: D, bucket: Bucket) -> Self {
        Self {
            directory,
            bucket,
            marker: MARKER_SUBSTRING.to_string(),
        }
    }

    /// Override the marker-only substring.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Resolve the newest valid object for `source` on the UTC day of `now`.
    pub async fn resolve_latest(
        &self,
        source: &SourceId,
        now: DateTime<Utc>,
    ) -> Result<ObjectReference, ResolutionError> {
        let prefix = KeyPrefix::for_time(source, now);
        let keys = self.directory.list(&self.bucket, &prefix).await?;
        let key_count = keys.len();

        debug!(prefix = %prefix, key_count, "Resolving latest object");

        let key = select_latest(keys, &self.marker).map_err(|e| match e {
            SelectError::Empty => ResolutionError::NoFilesFound {
                prefix: prefix.clone(),
            },
            SelectError::OnlyMarker { key } => ResolutionError::NoValidFile {
                prefix: prefix.clone(),
                key_count,
                marker_key: key,
            },
        })?;

        Ok(ObjectReference::new(self.bucket.clone(), key))
    }
}
