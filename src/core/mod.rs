//! Core engine modules - prefetch queues, playback, drain scheduling.
//!
//! These modules form the scrub/display engine, independent of UI.

pub mod playback;
pub mod prefetch;
pub mod ticker;

// Re-exports for convenience
pub use playback::Playback;
pub use prefetch::{DisplaySink, PrefetchQueue, PrefetchRequest, DEFAULT_MAX_QUEUED};
pub use ticker::IntervalTicker;
