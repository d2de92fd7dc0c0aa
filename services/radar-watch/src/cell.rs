//! Latest-reference cell shared by the poller and the render loop.
//!
//! A single slot holding the most recent valid object reference, or nothing
//! if none has been found yet. Writes are atomic pointer swaps through
//! `ArcSwapOption`, so a reader always sees a complete old or new value and
//! never blocks the writer.
//!
//! Invariant: once filled, the cell is never emptied. There is no `clear`.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use radar_object_keys::ObjectReference;

/// Result of offering a reference to the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellUpdate {
    /// The cell was empty and now holds the reference.
    Initialized,
    /// A different reference was replaced.
    Replaced { previous: Arc<ObjectReference> },
    /// The cell already held an equal reference; nothing was stored.
    Unchanged,
}

/// Single-slot holder for the newest known object reference.
pub struct LatestReferenceCell {
    slot: ArcSwapOption<ObjectReference>,
}

impl LatestReferenceCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Current reference, if one has been published.
    pub fn get(&self) -> Option<Arc<ObjectReference>> {
        self.slot.load_full()
    }

    /// Unconditionally replace the held reference.
    pub fn set(&self, reference: ObjectReference) {
        self.slot.store(Some(Arc::new(reference)));
    }

    /// Store `reference` unless the cell already holds an equal one.
    pub fn replace_if_changed(&self, reference: ObjectReference) -> CellUpdate {
        if let Some(current) = self.slot.load().as_deref() {
            if *current == reference {
                return CellUpdate::Unchanged;
            }
        }

        match self.slot.swap(Some(Arc::new(reference))) {
            Some(previous) => CellUpdate::Replaced { previous },
            None => CellUpdate::Initialized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.load().is_none()
    }
}

impl Default for LatestReferenceCell {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LatestReferenceCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestReferenceCell")
            .field("reference", &self.get())
            .finish()
    }
}

/// Shared cell reference.
pub type SharedReferenceCell = Arc<LatestReferenceCell>;
