//! # radar-object-keys
//!
//! Key layout and selection policy for time-partitioned radar archives.
//!
//! ## Key Layout
//!
//! Objects for a source are published under a per-day partition:
//!
//! ```text
//! {year}/{month:02}/{day:02}/{SOURCE}/{object name}
//! ```
//!
//! Examples:
//! - `2024/05/01/KOKX/KOKX20240501_000412_V06`
//! - `2024/05/01/KOKX/KOKX20240501_000412_V06_MDM`
//!
//! Object names sort lexicographically in publication order, so the greatest
//! key under a prefix is the newest object. Names containing the marker
//! substring ([`MARKER_SUBSTRING`]) are metadata-only manifests, not payload.
//!
//! This crate does no I/O. Listing keys is the caller's job.

mod error;
mod select;
mod types;

pub use error::{KeyError, SelectError};
pub use select::select_latest;
pub use types::*;

/// Substring identifying metadata-only objects.
pub const MARKER_SUBSTRING: &str = "MDM";

/// Scheme used when rendering an [`ObjectReference`].
pub const REFERENCE_SCHEME: &str = "s3";
