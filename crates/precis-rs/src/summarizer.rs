//! Single-call summarization over a [`Backend`].
//!
//! Builds the (system, user) message pair for one chunk or for the final
//! consolidation pass and issues exactly one backend call per invocation.
//! Retry, ordering, and the partial-failure policy all live in the
//! [`pipeline`](crate::pipeline) coordinator — this module only knows how to
//! phrase a request and clean up the answer.

use crate::error::BackendError;
use crate::pipeline::PipelineConfig;
use crate::{Backend, ChatMessage, ChatOptions, ChatRequest};

/// Fixed role for per-chunk calls. The caller's instruction is appended so
/// the model shapes each partial summary the way the final answer should be
/// shaped.
const CHUNK_ROLE: &str = "\
You are a summarization assistant. Produce a clear, concise summary of the \
provided text, preserving all key information. Follow the user's instruction \
for the shape and emphasis of the summary.";

/// Fixed role for the consolidation call.
const CONSOLIDATION_ROLE: &str = "\
You are a summarization assistant. The provided text consists of partial \
summaries of consecutive sections of one document. Combine them into one \
coherent summary that follows the original instruction. Do not mention that \
the input was split into parts.";

/// Build the system directive for a per-chunk call.
pub fn chunk_directive(instruction: &str) -> String {
    format!("{CHUNK_ROLE}\n\nInstruction: {instruction}")
}

/// Build the system directive for the consolidation call.
pub fn consolidation_directive(instruction: &str) -> String {
    format!("{CONSOLIDATION_ROLE}\n\nOriginal instruction: {instruction}")
}

/// Issues one summarization request at a time against a borrowed backend.
///
/// Stateless beyond its configuration; safe to reuse across calls and runs.
pub struct Summarizer<'a, B: Backend + ?Sized> {
    backend: &'a B,
    model: String,
    temperature: f32,
    max_context: Option<u32>,
}

impl<'a, B: Backend + ?Sized> Summarizer<'a, B> {
    pub fn new(backend: &'a B, config: &PipelineConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
            max_context: config.max_context,
        }
    }

    /// Summarize one chunk of document text under the user's instruction.
    /// Exactly one backend call; no retries at this layer.
    pub async fn summarize_chunk(
        &self,
        text: &str,
        instruction: &str,
    ) -> Result<String, BackendError> {
        let raw = self
            .backend
            .chat(self.request(chunk_directive(instruction), text))
            .await?;
        Ok(clean_output(&raw))
    }

    /// Combine joined partial summaries into the final answer. Exactly one
    /// backend call; no retries at this layer.
    pub async fn consolidate(
        &self,
        joined: &str,
        instruction: &str,
    ) -> Result<String, BackendError> {
        let raw = self
            .backend
            .chat(self.request(consolidation_directive(instruction), joined))
            .await?;
        Ok(clean_output(&raw))
    }

    fn request(&self, system: String, content: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(content)],
            options: Some(ChatOptions {
                temperature: Some(self.temperature),
                num_ctx: self.max_context,
            }),
            stream: false,
        }
    }
}

/// Strip surrounding whitespace and the leading role marker some models emit.
fn clean_output(raw: &str) -> String {
    let trimmed = raw.trim();
    for marker in ["assistant:", "Assistant:"] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;
    use crate::testing::ScriptedBackend;

    #[test]
    fn chunk_directive_carries_role_and_instruction() {
        let directive = chunk_directive("Focus on the financials.");
        assert!(directive.contains("clear, concise summary"));
        assert!(directive.contains("Instruction: Focus on the financials."));
    }

    #[test]
    fn consolidation_directive_carries_original_instruction() {
        let directive = consolidation_directive("Three bullet points.");
        assert!(directive.contains("Combine them into one coherent summary"));
        assert!(directive.contains("Original instruction: Three bullet points."));
    }

    #[test]
    fn clean_output_strips_role_markers_and_whitespace() {
        assert_eq!(clean_output("  a summary \n"), "a summary");
        assert_eq!(clean_output("assistant: a summary"), "a summary");
        assert_eq!(clean_output("Assistant:\na summary"), "a summary");
        // Untouched when there is nothing to strip.
        assert_eq!(clean_output("plain"), "plain");
    }

    #[tokio::test]
    async fn summarize_chunk_sends_system_and_user_messages() {
        let backend = ScriptedBackend::new([Ok("  assistant: the gist  ".to_string())]);
        let config = PipelineConfig::new().with_temperature(0.3);
        let summarizer = Summarizer::new(&backend, &config);

        let summary = summarizer
            .summarize_chunk("chunk body", "keep it short")
            .await
            .unwrap();
        assert_eq!(summary, "the gist");
        assert_eq!(backend.call_count(), 1);

        let request = backend.calls().remove(0);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.contains("keep it short"));
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert_eq!(request.messages[1].content, "chunk body");
        assert!(!request.stream);
        assert_eq!(request.options.as_ref().unwrap().temperature, Some(0.3));
    }

    #[tokio::test]
    async fn consolidate_passes_joined_text_as_content() {
        let backend = ScriptedBackend::new([Ok("final".to_string())]);
        let config = PipelineConfig::new().with_max_context(4096);
        let summarizer = Summarizer::new(&backend, &config);

        let summary = summarizer
            .consolidate("part one\n\npart two", "one paragraph")
            .await
            .unwrap();
        assert_eq!(summary, "final");

        let request = backend.calls().remove(0);
        assert!(request.messages[0].content.contains("one paragraph"));
        assert_eq!(request.messages[1].content, "part one\n\npart two");
        assert_eq!(request.options.as_ref().unwrap().num_ctx, Some(4096));
    }

    #[tokio::test]
    async fn backend_failure_passes_through_typed() {
        let backend = ScriptedBackend::new([Err(BackendError::EmptyResponse)]);
        let config = PipelineConfig::new();
        let summarizer = Summarizer::new(&backend, &config);

        let err = summarizer.summarize_chunk("text", "any").await.unwrap_err();
        assert!(matches!(err, BackendError::EmptyResponse));
    }
}
