//! Test doubles shared across module tests.

use crate::error::BackendError;
use crate::pipeline::ProgressSink;
use crate::{Backend, BackendFuture, ChatRequest};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A [`Backend`] that replays scripted responses in order and records every
/// request it sees. Deterministic, so identical runs yield identical results.
pub(crate) struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new(responses: impl IntoIterator<Item = Result<String, BackendError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of chat calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of every request received, in call order.
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    fn chat(&self, request: ChatRequest) -> BackendFuture<'_> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("scripted fallback".to_string()))
        })
    }
}

/// A [`ProgressSink`] that records every update for assertions.
#[derive(Default)]
pub(crate) struct CollectingSink {
    updates: Mutex<Vec<(f64, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<(f64, String)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn on_progress(&self, percent: f64, status: &str) {
        self.updates
            .lock()
            .unwrap()
            .push((percent, status.to_string()));
    }
}
