//! Configuration for a pipeline run.
//!
//! [`PipelineConfig::new`] gives working defaults for a local Ollama
//! instance; chain `with_*` methods for the settings callers routinely
//! customize. All fields are public for anything beyond that.

use crate::api::retry::RetryConfig;
use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TEMPERATURE};

/// What the coordinator does when a single chunk's backend call fails.
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy {
    /// Record the failure, skip the chunk, and continue. The run still fails
    /// when no chunk succeeds at all, or when the failed fraction exceeds
    /// `max_failed_fraction` — a summary silently missing most of its source
    /// is worse than an error.
    Continue { max_failed_fraction: f64 },
    /// The first failed chunk aborts the run.
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Continue {
            max_failed_fraction: 0.5,
        }
    }
}

/// Configuration for a [`Pipeline`](super::Pipeline) run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the Ollama instance.
    pub base_url: String,
    /// Model identifier (e.g. `"llama3.2:3b"`).
    pub model: String,
    /// Sampling temperature in `[0, 1]`. Low favors faithfulness.
    pub temperature: f32,
    /// Upper bound on the backend context window, in tokens. `None` leaves
    /// the backend's default in place.
    pub max_context: Option<u32>,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Retry configuration for transient backend failures. No retries by
    /// default.
    pub retry: RetryConfig,
    /// What a single chunk failure does to the run.
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_context: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryConfig::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Ollama base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature, clamped to `[0, 1]`.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Bound the backend context window (`num_ctx`).
    pub fn with_max_context(mut self, max_context: u32) -> Self {
        self.max_context = Some(max_context);
        self
    }

    /// Set the target chunk size in characters.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable automatic retries for transient backend failures. Uses
    /// exponential backoff with jitter. Pass `0` to disable (the default).
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retry = RetryConfig::with_retries(max_retries);
        self
    }

    /// Set the partial-failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
