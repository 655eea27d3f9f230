//! Progress reporting for pipeline runs.
//!
//! The coordinator is the only writer of progress state; sinks are read-only
//! observers. Updates carry a cumulative percent in `[0, 100]` — never
//! decreasing within a run — and a short human-readable status line.
//!
//! # Choosing a sink
//!
//! | Sink | Use case |
//! |------|----------|
//! | [`NoopSink`] | Tests or fire-and-forget runs |
//! | [`LoggingSink`] | Structured logging via `tracing` |
//! | [`FnSink`] | Quick closures for simple callbacks |
//! | [`ChannelSink`] | Cross-task hand-off to a UI that owns its own state |

use tokio::sync::mpsc;
use tracing::info;

/// One progress update from the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Cumulative completion in `[0, 100]`.
    pub percent: f64,
    /// Short status line, e.g. `Summarized chunk 2/5`.
    pub status: String,
}

/// Observer for pipeline progress.
///
/// Implementations must tolerate being called from whatever task the
/// pipeline runs on and marshal to their own context if they need one —
/// [`ChannelSink`] does exactly that for UI threads.
pub trait ProgressSink: Send + Sync {
    /// Called after every pipeline step. The default implementation ignores
    /// the update.
    fn on_progress(&self, percent: f64, status: &str) {
        let _ = (percent, status);
    }
}

/// Reports nothing.
pub struct NoopSink;
impl ProgressSink for NoopSink {}

/// Logs progress via `tracing`.
pub struct LoggingSink;

impl ProgressSink for LoggingSink {
    fn on_progress(&self, percent: f64, status: &str) {
        info!("[{percent:5.1}%] {status}");
    }
}

/// Adapts a closure into a [`ProgressSink`], avoiding the boilerplate of a
/// struct and impl for simple callbacks.
pub struct FnSink<F>(F)
where
    F: Fn(f64, &str) + Send + Sync;

impl<F> FnSink<F>
where
    F: Fn(f64, &str) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn on_progress(&self, percent: f64, status: &str) {
        (self.0)(percent, status);
    }
}

/// Delivers updates over an unbounded channel for cross-task hand-off.
///
/// A UI-owning task is typically the only permitted mutator of UI state, so
/// the pipeline must not touch it directly. Give the pipeline a
/// `ChannelSink` and drain the receiver from the UI task instead:
///
/// ```ignore
/// let (sink, mut updates) = ChannelSink::new();
/// tokio::spawn(async move {
///     while let Some(update) = updates.recv().await {
///         render(update.percent, &update.status);
///     }
/// });
/// ```
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelSink {
    /// Create a sink and the receiver to drain it from another task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, percent: f64, status: &str) {
        // A dropped receiver means the caller stopped listening; losing the
        // update is fine.
        let _ = self.tx.send(ProgressUpdate {
            percent,
            status: status.to_string(),
        });
    }
}
