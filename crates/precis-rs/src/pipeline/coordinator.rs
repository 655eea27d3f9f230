//! The map-reduce run loop.
//!
//! [`Pipeline::run`] validates its inputs, chunks the document, summarizes
//! every chunk strictly in order (the map phase), then issues one
//! consolidation call over the joined partial summaries (the reduce phase).
//! Sequential execution is deliberate: consolidation needs deterministic
//! ordering of the partials, and local backends are resource-constrained per
//! caller.
//!
//! `run` is a single blocking unit of async work. Callers that need a
//! responsive front-end spawn it on a worker task and receive progress
//! through a [`ChannelSink`](super::progress::ChannelSink).

use super::config::{FailurePolicy, PipelineConfig};
use super::progress::{NoopSink, ProgressSink};
use crate::api::retry::retry_backend_call;
use crate::chunker::{self, CHUNK_JOIN};
use crate::error::{BackendError, PipelineError};
use crate::summarizer::Summarizer;
use crate::Backend;
use tracing::{debug, info, warn};

/// The outcome of a successful [`Pipeline::run`].
#[derive(Debug)]
pub struct RunResult {
    /// The consolidated summary.
    pub summary: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Chunks whose backend call failed and were skipped (always empty under
    /// [`FailurePolicy::Abort`]).
    pub failed_chunks: Vec<(usize, BackendError)>,
}

impl RunResult {
    /// Whether every chunk contributed to the summary.
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }
}

/// The map-reduce summarization loop.
///
/// Borrows the backend and progress sink by reference; both must outlive the
/// `run` call. Bind the sink to a `let` binding before building the pipeline:
///
/// ```ignore
/// let client = OllamaClient::new(DEFAULT_OLLAMA_URL)?;
/// let (sink, mut updates) = ChannelSink::new();
///
/// let result = Pipeline::new(&client, PipelineConfig::new())
///     .with_progress_sink(&sink)
///     .run(&text, &instruction)
///     .await?;
/// ```
pub struct Pipeline<'a, B: Backend + ?Sized> {
    backend: &'a B,
    config: PipelineConfig,
    sink: &'a dyn ProgressSink,
    /// Optional stop signal — checked between chunk iterations, never
    /// mid-call. If it returns `true`, the run ends with
    /// [`PipelineError::Cancelled`].
    stop_signal: Option<Box<dyn Fn() -> bool + Send + Sync + 'a>>,
}

impl<'a, B: Backend + ?Sized> Pipeline<'a, B> {
    pub fn new(backend: &'a B, config: PipelineConfig) -> Self {
        Self {
            backend,
            config,
            sink: &NoopSink,
            stop_signal: None,
        }
    }

    /// Observe progress through `sink`. Defaults to [`NoopSink`].
    pub fn with_progress_sink(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.sink = sink;
        self
    }

    /// Install a cooperative stop signal.
    pub fn with_stop_signal(mut self, signal: impl Fn() -> bool + Send + Sync + 'a) -> Self {
        self.stop_signal = Some(Box::new(signal));
        self
    }

    /// Run the full pipeline over `text` under `instruction`.
    ///
    /// Produces exactly one result per invocation: the consolidated summary
    /// on success, or the first fatal [`PipelineError`] otherwise. Chunk
    /// failures under the default policy are not fatal — they are recorded
    /// in [`RunResult::failed_chunks`] and the run continues.
    pub async fn run(&self, text: &str, instruction: &str) -> Result<RunResult, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::MissingInput("document text"));
        }
        if instruction.trim().is_empty() {
            return Err(PipelineError::MissingInput("instruction"));
        }

        let chunks = chunker::chunk(text, self.config.chunk_size);
        let total = chunks.len();
        info!(
            "document split into {total} chunk(s) at target {} chars",
            self.config.chunk_size
        );

        let summarizer = Summarizer::new(self.backend, &self.config);
        let mut partials: Vec<String> = Vec::new();
        let mut failed: Vec<(usize, BackendError)> = Vec::new();

        for chunk in &chunks {
            if self.stopped() {
                return Err(PipelineError::Cancelled);
            }
            debug!("summarizing chunk {}/{total} ({} chars)", chunk.index, chunk.len());

            let outcome = retry_backend_call(&self.config.retry, || {
                summarizer.summarize_chunk(&chunk.text, instruction)
            })
            .await;

            match outcome {
                Ok(summary) => partials.push(summary),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::ChunkFailed {
                            index: chunk.index,
                            source: err,
                        });
                    }
                    FailurePolicy::Continue { .. } => {
                        warn!("chunk {}/{total} failed, skipping: {err}", chunk.index);
                        failed.push((chunk.index, err));
                    }
                },
            }

            self.report(
                100.0 * chunk.index as f64 / total as f64,
                &format!("Summarized chunk {}/{total}", chunk.index),
            );
        }

        if partials.is_empty() {
            return Err(PipelineError::NoSummaryProduced { chunk_count: total });
        }
        if let FailurePolicy::Continue { max_failed_fraction } = self.config.failure_policy
            && failed.len() as f64 / total as f64 > max_failed_fraction
        {
            return Err(PipelineError::TooManyChunkFailures {
                failed: failed.len(),
                total,
            });
        }

        self.report(100.0, "Consolidating partial summaries");
        let joined = partials.join(CHUNK_JOIN);
        let summary = retry_backend_call(&self.config.retry, || {
            summarizer.consolidate(&joined, instruction)
        })
        .await
        .map_err(|source| PipelineError::ConsolidationFailed {
            source,
            partial_summaries: partials.clone(),
        })?;

        self.report(100.0, "complete");
        info!(
            "run complete: {} of {total} chunk(s) summarized into {} chars",
            partials.len(),
            summary.len()
        );

        Ok(RunResult {
            summary,
            chunk_count: total,
            failed_chunks: failed,
        })
    }

    fn report(&self, percent: f64, status: &str) {
        self.sink.on_progress(percent, status);
    }

    fn stopped(&self) -> bool {
        self.stop_signal.as_ref().is_some_and(|signal| signal())
    }
}
