//! Map-reduce document summarization over a local Ollama backend.
//!
//! `precis-rs` turns an arbitrarily long document plus a user instruction into
//! one coherent summary. The document is split into bounded-size,
//! paragraph-preserving chunks; each chunk is summarized independently under
//! the instruction (the map phase); the partial summaries are then combined
//! by one final backend call (the reduce phase). Progress and failures are
//! tracked across the whole run and surfaced through typed values — the
//! pipeline never panics on a backend failure.
//!
//! # Getting started
//!
//! ```ignore
//! use precis_rs::{PipelineConfig, summarize_document};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), precis_rs::PipelineError> {
//!     let config = PipelineConfig::new()
//!         .with_model("llama3.2:3b")
//!         .with_retries(2);
//!
//!     let summary = summarize_document(
//!         &std::fs::read_to_string("report.txt").unwrap(),
//!         "Summarize the key findings in three paragraphs.",
//!         &config,
//!     )
//!     .await?;
//!
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! Callers that want live progress or a custom backend build a
//! [`Pipeline`](pipeline::Pipeline) directly:
//!
//! ```ignore
//! use precis_rs::OllamaClient;
//! use precis_rs::pipeline::{ChannelSink, Pipeline, PipelineConfig};
//!
//! let client = OllamaClient::new(precis_rs::DEFAULT_OLLAMA_URL)?;
//! let (sink, mut updates) = ChannelSink::new();
//!
//! let result = Pipeline::new(&client, PipelineConfig::new())
//!     .with_progress_sink(&sink)
//!     .run(&text, "One paragraph, plain language.")
//!     .await?;
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chunker`] | Paragraph-preserving splitting into ordered [`Chunk`]s |
//! | [`summarizer`] | Per-chunk and consolidation prompts, one backend call each |
//! | [`pipeline`] | The [`Pipeline`](pipeline::Pipeline) run loop, config, progress sinks |
//! | [`api`] | Retry with exponential backoff for transient backend errors |
//! | [`error`] | [`BackendError`] and [`PipelineError`] taxonomies |
//!
//! The crate root holds the Ollama `/api/chat` wire types, the [`Backend`]
//! trait the pipeline is generic over, and the [`OllamaClient`] that
//! implements it.

pub mod api;
pub mod chunker;
pub mod error;
pub mod pipeline;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::debug;

pub use chunker::{CHUNK_JOIN, Chunk, DEFAULT_CHUNK_SIZE, chunk};
pub use error::{BackendError, PipelineError};
pub use pipeline::{
    FailurePolicy, Pipeline, PipelineConfig, ProgressSink, ProgressUpdate, RunResult,
};

// ── Constants ──────────────────────────────────────────────────────

/// Default base URL of a local Ollama instance.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model for all backend calls.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Default sampling temperature. Low, to favor faithfulness over creativity.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

// ── Wire types ─────────────────────────────────────────────────────

/// Role of a message in a chat request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in a chat request or response.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the backend. Unset fields are omitted from
/// serialization so the backend's own defaults apply.
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on the context window, in tokens (`num_ctx` on Ollama).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

/// Chat request body for Ollama's `/api/chat` endpoint.
#[derive(Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
    /// Always `false`: each call fully completes before the pipeline moves on.
    pub stream: bool,
}

/// Response body of a non-streaming `/api/chat` call. Fields the pipeline
/// does not consume (timings, token counts) are ignored on deserialization.
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}

// ── Backend trait ──────────────────────────────────────────────────

/// Boxed future returned by [`Backend::chat`].
///
/// Type alias to keep trait signatures and implementations readable; boxing
/// keeps the trait dyn-compatible and lets tests substitute scripted doubles.
pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;

/// A text-generation service that answers one chat request at a time.
///
/// The pipeline issues calls strictly sequentially and treats every failure
/// as a typed [`BackendError`], so implementations must classify their own
/// failure modes rather than panic. Implementations are stateless beyond
/// their configuration and may be reused across runs.
pub trait Backend: Send + Sync {
    /// Send one chat request and return the generated text.
    fn chat(&self, request: ChatRequest) -> BackendFuture<'_>;
}

// ── Ollama client ──────────────────────────────────────────────────

/// Async HTTP client for Ollama's `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the Ollama instance at `base_url`.
    ///
    /// Generation against small local models is slow, so the request timeout
    /// is generous (5 minutes per call).
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent("precis/0.3")
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, BackendError> {
        debug!(
            "backend request: model={}, messages={}, content={} chars",
            request.model,
            request.messages.len(),
            request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::Connection(format!("failed to read response: {e}")))?;

        debug!(
            "backend response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            body.len()
        );

        parse_chat_response(status.as_u16(), &body)
    }
}

impl Backend for OllamaClient {
    fn chat(&self, request: ChatRequest) -> BackendFuture<'_> {
        Box::pin(async move { self.send(&request).await })
    }
}

/// Classify an HTTP status + body pair into generated text or a typed error.
///
/// Split out from the client so the classification is testable without a
/// live backend.
fn parse_chat_response(status: u16, body: &str) -> Result<String, BackendError> {
    if !(200..300).contains(&status) {
        return Err(BackendError::Http {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

    match parsed.message {
        Some(message) if !message.content.trim().is_empty() => Ok(message.content),
        _ => Err(BackendError::EmptyResponse),
    }
}

// ── Convenience ────────────────────────────────────────────────────

/// Run the whole pipeline in one call: chunk `text`, summarize every chunk
/// under `instruction` against the configured Ollama instance, consolidate,
/// and return the final summary.
///
/// This is the single externally-invokable entry point for callers that do
/// not need progress reporting or a custom [`Backend`]. Build a
/// [`Pipeline`](pipeline::Pipeline) directly for those.
pub async fn summarize_document(
    text: &str,
    instruction: &str,
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let client = OllamaClient::new(&config.base_url).map_err(PipelineError::Client)?;
    let result = Pipeline::new(&client, config.clone())
        .run(text, instruction)
        .await?;
    Ok(result.summary)
}
