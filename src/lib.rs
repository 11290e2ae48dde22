//! TRAWLVIEW - Dual-camera deployment browser library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (prefetch, playback, drain scheduling)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod deployment;
pub mod dialogs;
pub mod events;
pub mod widgets;

// Re-export commonly used types from core
pub use core::{DisplaySink, IntervalTicker, Playback, PrefetchQueue, PrefetchRequest};

// Re-export the data layer
pub use deployment::{Deployment, MarkSet, SensorLog};
