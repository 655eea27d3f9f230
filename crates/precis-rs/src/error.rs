//! Typed failures for backend calls and pipeline runs.
//!
//! Backend calls never surface unstructured errors: every failure mode a
//! single call can hit is a [`BackendError`] variant, so the coordinator can
//! apply its partial-failure policy by matching instead of string-probing.
//! Run-level outcomes are [`PipelineError`] variants, one per way a run can
//! end without a summary.

use thiserror::Error;

/// A single backend call failed.
#[derive(Debug, Error, Clone)]
pub enum BackendError {
    /// The backend could not be reached, or the connection dropped mid-call.
    #[error("backend connection failed: {0}")]
    Connection(String),
    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The response body did not match the expected chat shape.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    /// The backend answered without any generated content.
    #[error("backend returned an empty response")]
    EmptyResponse,
}

impl BackendError {
    /// Whether a retry can plausibly succeed.
    ///
    /// Rate limiting (429), server-side errors (5xx), and connection failures
    /// are transient. Client errors and malformed or empty bodies are not —
    /// re-sending the same request will fail the same way.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::MalformedResponse(_) | Self::EmptyResponse => false,
        }
    }
}

/// A pipeline run ended without a summary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty or whitespace-only document text or instruction. Rejected
    /// before any backend call is made.
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    /// The HTTP client for the backend could not be constructed.
    #[error("backend client: {0}")]
    Client(#[source] BackendError),
    /// Every chunk's backend call failed, so there is nothing to consolidate.
    #[error("no summary produced: all {chunk_count} chunk call(s) failed")]
    NoSummaryProduced { chunk_count: usize },
    /// More chunks failed than the configured threshold allows.
    #[error("too many chunk failures: {failed} of {total}")]
    TooManyChunkFailures { failed: usize, total: usize },
    /// A chunk call failed under [`FailurePolicy::Abort`](crate::pipeline::FailurePolicy).
    #[error("chunk {index} failed: {source}")]
    ChunkFailed { index: usize, source: BackendError },
    /// The final consolidation call failed. The partial summaries computed in
    /// the map phase are carried here so callers can surface a degraded
    /// result; the run itself is still a failure.
    #[error("consolidation failed: {source}")]
    ConsolidationFailed {
        source: BackendError,
        partial_summaries: Vec<String>,
    },
    /// The stop signal was raised between chunk calls.
    #[error("run cancelled")]
    Cancelled,
}
