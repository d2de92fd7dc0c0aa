//! Key components: source identifiers, day partitions, keys and references.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::KeyError;
use crate::REFERENCE_SCHEME;

/// Normalized source (station) identifier.
///
/// Uppercased with all whitespace removed, so `" k okx "` and `"KOKX"` name
/// the same source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Normalize and validate a raw source name.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();

        if normalized.is_empty() {
            return Err(KeyError::EmptySource);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SourceId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Day partition to list under: `{year}/{month:02}/{day:02}/{SOURCE}/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Prefix for a source on a given calendar day.
    pub fn for_date(source: &SourceId, date: NaiveDate) -> Self {
        Self(format!(
            "{}/{:02}/{:02}/{}/",
            date.year(),
            date.month(),
            date.day(),
            source
        ))
    }

    /// Prefix for the UTC day containing `now`.
    pub fn for_time(source: &SourceId, now: DateTime<Utc>) -> Self {
        Self::for_date(source, now.date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A key returned by a directory listing.
///
/// Ordering is plain lexicographic order on the key string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns true if this key names a metadata-only object.
    pub fn is_marker(&self, marker: &str) -> bool {
        !marker.is_empty() && self.0.contains(marker)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ObjectKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Name of the bucket objects are listed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bucket(String);

impl Bucket {
    /// Trim and validate a bucket name.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KeyError::EmptyBucket);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Bucket {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fully-qualified object locator, rendered as `s3://{bucket}/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectReference {
    bucket: Bucket,
    key: ObjectKey,
}

impl ObjectReference {
    pub fn new(bucket: Bucket, key: ObjectKey) -> Self {
        Self { bucket, key }
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Anonymous HTTPS location of the object payload.
    pub fn https_url(&self) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", REFERENCE_SCHEME, self.bucket, self.key)
    }
}
