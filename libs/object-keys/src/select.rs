//! Latest-object selection policy.

use crate::error::SelectError;
use crate::types::ObjectKey;

/// Pick the newest payload key from a listing.
///
/// Keys are ranked in descending lexicographic order. If the top-ranked key
/// is a marker-only object, exactly one position is skipped and the
/// second-ranked key is taken whether or not it is itself a marker. Runs of
/// two or more markers at the top are not looked past.
pub fn select_latest(mut keys: Vec<ObjectKey>, marker: &str) -> Result<ObjectKey, SelectError> {
    keys.sort_unstable_by(|a, b| b.cmp(a));

    let mut ranked = keys.into_iter();
    let Some(top) = ranked.next() else {
        return Err(SelectError::Empty);
    };

    if !top.is_marker(marker) {
        return Ok(top);
    }

    ranked.next().ok_or_else(|| SelectError::OnlyMarker {
        key: top.into_string(),
    })
}
