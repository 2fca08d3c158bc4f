// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` implements `GenerationBackend` with scripted results,
//! enabling fast tests without calls to a real generation service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docent_core::error::{DocentError, GenerationFailureKind};
use docent_core::traits::{Adapter, GenerationBackend};
use docent_core::types::{
    AdapterType, FinishReason, GenerationRequest, HealthStatus, RawGeneration, TokenUsage,
};

/// One scripted backend result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Completed normally with this text.
    Text(String),
    /// Stopped early (output limit reached) with this text, often empty.
    Incomplete(String),
    Error(GenerationFailureKind, String),
    /// Never answers.
    Hang,
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// A mock generation backend that returns scripted results.
///
/// Results are popped from a FIFO queue. When the queue is empty, a default
/// "mock answer" text is returned.
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock backend pre-loaded with the given results.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Waits `delay` before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::text("mock answer"))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::GenerationBackend
    }

    async fn health_check(&self) -> Result<HealthStatus, DocentError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocentError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<RawGeneration, DocentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let usage = Some(TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        });
        match self.next_reply().await {
            MockReply::Text(text) => Ok(RawGeneration {
                text,
                finish: FinishReason::Completed,
                usage,
            }),
            MockReply::Incomplete(text) => Ok(RawGeneration {
                text,
                finish: FinishReason::Incomplete {
                    reason: Some("max_output_tokens".to_string()),
                },
                usage,
            }),
            MockReply::Error(kind, message) => Err(DocentError::generation(kind, message)),
            MockReply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            instructions: String::new(),
            history: Vec::new(),
            user_text: "q".to_string(),
            corpus_id: "vs_1".to_string(),
            max_output_tokens: 64,
        }
    }

    #[tokio::test]
    async fn scripted_then_default() {
        let backend = MockBackend::with_replies(vec![
            MockReply::text("first"),
            MockReply::Error(GenerationFailureKind::Auth, "401".to_string()),
        ]);

        assert_eq!(backend.generate(request()).await.unwrap().text, "first");
        assert!(backend.generate(request()).await.is_err());
        assert_eq!(backend.generate(request()).await.unwrap().text, "mock answer");
        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn incomplete_reports_finish_reason() {
        let backend = MockBackend::with_replies(vec![MockReply::Incomplete(String::new())]);
        let raw = backend.generate(request()).await.unwrap();
        assert!(raw.text.is_empty());
        assert!(matches!(raw.finish, FinishReason::Incomplete { .. }));
    }
}
