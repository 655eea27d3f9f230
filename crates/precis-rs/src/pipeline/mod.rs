//! The map-reduce coordination layer.
//!
//! - [`config`] — [`PipelineConfig`] builder: backend location, model,
//!   sampling, chunk size, retry, and the partial-failure policy.
//! - [`progress`] — the [`ProgressSink`] observer trait and ready-made sinks
//!   for logging, closures, and cross-task channel hand-off.
//! - [`coordinator`] — [`Pipeline`], the run loop that chunks the document,
//!   summarizes every chunk in order, and consolidates the partial summaries
//!   into one final answer.

pub mod config;
pub mod coordinator;
pub mod progress;

pub use config::{FailurePolicy, PipelineConfig};
pub use coordinator::{Pipeline, RunResult};
pub use progress::{ChannelSink, FnSink, LoggingSink, NoopSink, ProgressSink, ProgressUpdate};
