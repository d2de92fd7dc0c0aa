//! Object directory interface and S3 implementation.
//!
//! The directory abstracts the one remote operation the watcher needs:
//! listing every key under a prefix. It does no retrying; a failed listing is
//! reported upward and the poller tries again on its next cycle.
//!
//! - [`S3Directory`]: anonymous `ListObjectsV2` against a public bucket
//! - [`TimeoutDirectory`]: bounds any directory call with a deadline

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use radar_object_keys::{Bucket, KeyPrefix, ObjectKey};
use thiserror::Error;
use tracing::debug;

/// Errors returned by a directory listing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The listing did not complete before the deadline.
    #[error("listing {prefix} timed out after {elapsed:?}")]
    Timeout { prefix: String, elapsed: Duration },

    /// The store rejected the request or the transport failed.
    #[error("listing s3://{bucket}/{prefix} failed: {message}")]
    Request {
        bucket: String,
        prefix: String,
        message: String,
    },
}

impl DirectoryError {
    /// Prefix the failed listing was searching.
    pub fn prefix(&self) -> &str {
        match self {
            Self::Timeout { prefix, .. } | Self::Request { prefix, .. } => prefix,
        }
    }
}

/// Lists object keys under a prefix.
#[async_trait]
pub trait ObjectDirectory: Send + Sync {
    /// Return every key under `prefix` in `bucket`, in store order.
    async fn list(
        &self,
        bucket: &Bucket,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ObjectKey>, DirectoryError>;
}

#[async_trait]
impl<D: ObjectDirectory + ?Sized> ObjectDirectory for Arc<D> {
    async fn list(
        &self,
        bucket: &Bucket,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ObjectKey>, DirectoryError> {
        (**self).list(bucket, prefix).await
    }
}

/// S3-backed directory using unsigned requests.
#[derive(Clone)]
pub struct S3Directory {
    client: Client,
}

impl S3Directory {
    /// Build a client for `region` that sends no credentials.
    pub async fn anonymous(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .no_credentials()
            .load()
            .await;

        Self::from_client(Client::new(&sdk_config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectDirectory for S3Directory {
    async fn list(
        &self,
        bucket: &Bucket,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ObjectKey>, DirectoryError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket.as_str())
                .prefix(prefix.as_str())
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| DirectoryError::Request {
                    bucket: bucket.to_string(),
                    prefix: prefix.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;
            pages += 1;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(ObjectKey::from),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(
            bucket = %bucket,
            prefix = %prefix,
            pages,
            key_count = keys.len(),
            "Listed objects"
        );

        Ok(keys)
    }
}

/// Wraps a directory so each listing gives up after `limit`.
pub struct TimeoutDirectory<D> {
    inner: D,
    limit: Duration,
}

impl<D> TimeoutDirectory<D> {
    pub fn new(inner: D, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<D: ObjectDirectory> ObjectDirectory for TimeoutDirectory<D> {
    async fn list(
        &self,
        bucket: &Bucket,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ObjectKey>, DirectoryError> {
        match tokio::time::timeout(self.limit, self.inner.list(bucket, prefix)).await {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout {
                prefix: prefix.to_string(),
                elapsed: self.limit,
            }),
        }
    }
}
