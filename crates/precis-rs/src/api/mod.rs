//! Backend call support: retry with exponential backoff.
//!
//! The pipeline performs no chunk-level retries by default. When a caller
//! opts in (see [`PipelineConfig::with_retries`](crate::pipeline::PipelineConfig::with_retries)),
//! [`retry::retry_backend_call`] wraps each backend call as a decorator —
//! chunk ordering and progress semantics are unaffected, the call just gets
//! more than one attempt. Only errors that
//! [`BackendError::is_transient`](crate::BackendError::is_transient) are
//! retried.

pub mod retry;

pub use retry::RetryConfig;
