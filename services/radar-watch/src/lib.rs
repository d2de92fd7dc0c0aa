//! radar-watch
//!
//! Tracks the newest radar volume published for a station in a public object
//! store and hands it to a renderer running on its own schedule.
//!
//! ## Architecture
//!
//! ```text
//! KeyResolver -> ObjectDirectory (S3 list) -> FreshnessPoller -> LatestReferenceCell
//!                                                                       |
//!                                                     render loop (pull) -> RenderSink
//! ```
//!
//! The poller and the render loop are independent tasks. The cell is the only
//! state they share.

pub mod cell;
pub mod config;
pub mod directory;
pub mod poller;
pub mod render;
pub mod resolver;

pub use cell::{CellUpdate, LatestReferenceCell, SharedReferenceCell};
pub use directory::{DirectoryError, ObjectDirectory, S3Directory, TimeoutDirectory};
pub use poller::{FreshnessPoller, PollOutcome, PollerState, PollerStateHandle};
pub use render::{run_render_loop, LoggingRenderSink, RenderSink};
pub use resolver::{KeyResolver, ResolutionError};
