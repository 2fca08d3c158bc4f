// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generation against the external backend.
//!
//! One attempt per event, bounded by a timeout. The backend's raw answer is
//! normalized into a [`GenerationOutcome`]; this layer never retries and never
//! returns an error.

use std::sync::Arc;
use std::time::Duration;

use docent_config::DocentConfig;
use docent_core::error::{DocentError, GenerationFailureKind};
use docent_core::traits::GenerationBackend;
use docent_core::types::{
    FinishReason, GenerationOutcome, GenerationRequest, HistoryTurn, RawGeneration,
};
use tracing::{debug, warn};

/// Calls the generation backend and normalizes its result.
pub struct ResponseGenerator {
    backend: Arc<dyn GenerationBackend>,
    instructions: String,
    timeout: Duration,
    max_output_tokens: u32,
    history_limit: usize,
}

impl ResponseGenerator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        instructions: impl Into<String>,
        timeout: Duration,
        max_output_tokens: u32,
        history_limit: usize,
    ) -> Self {
        Self {
            backend,
            instructions: instructions.into(),
            timeout,
            max_output_tokens,
            history_limit,
        }
    }

    pub fn from_config(config: &DocentConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self::new(
            backend,
            config.assistant.resolve_instructions(),
            config.generation.timeout(),
            config.generation.max_output_tokens,
            config.threads.history_turns,
        )
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    /// Generates an answer to `text`, grounded in `corpus_id`.
    ///
    /// `history` is oldest first; only the most recent turns up to the
    /// configured limit are sent.
    pub async fn generate(
        &self,
        text: &str,
        corpus_id: &str,
        mut history: Vec<HistoryTurn>,
    ) -> GenerationOutcome {
        if history.len() > self.history_limit {
            history.drain(..history.len() - self.history_limit);
        }

        let request = GenerationRequest {
            instructions: self.instructions.clone(),
            history,
            user_text: text.to_string(),
            corpus_id: corpus_id.to_string(),
            max_output_tokens: self.max_output_tokens,
        };
        debug!(
            corpus = corpus_id,
            history_turns = request.history.len(),
            "calling generation backend"
        );

        let result = match tokio::time::timeout(self.timeout, self.backend.generate(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(DocentError::Timeout {
                duration: self.timeout,
            }),
        };

        let outcome = interpret(result);
        if let Some(failure) = &outcome.error {
            warn!(
                category = "generation",
                kind = %failure.kind,
                detail = %failure.detail,
                "generation backend failed"
            );
        }
        outcome
    }
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("backend", &self.backend.name())
            .field("timeout", &self.timeout)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

/// Maps a raw backend result to a [`GenerationOutcome`].
///
/// - non-empty text: `ok`, whatever the finish reason
/// - empty text, incomplete finish: `truncated`
/// - empty text, normal finish: `empty`
/// - any error: `backend_error` with the failure kind
pub fn interpret(result: Result<RawGeneration, DocentError>) -> GenerationOutcome {
    match result {
        Ok(raw) => {
            let text = raw.text.trim();
            if !text.is_empty() {
                return GenerationOutcome::ok(text, raw.usage);
            }
            match raw.finish {
                FinishReason::Incomplete { reason } => {
                    debug!(reason = ?reason, "backend stopped before producing text");
                    GenerationOutcome::truncated(raw.usage)
                }
                FinishReason::Completed => GenerationOutcome::empty(raw.usage),
            }
        }
        Err(DocentError::Generation { kind, message, .. }) => {
            GenerationOutcome::backend_error(kind, message)
        }
        Err(DocentError::Timeout { duration }) => GenerationOutcome::backend_error(
            GenerationFailureKind::Timeout,
            format!("no answer within {duration:?}"),
        ),
        Err(other) => GenerationOutcome::backend_error(
            GenerationFailureKind::Transport,
            format!("{} error: {other}", other.category()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use docent_core::types::{OutcomeStatus, Role, TokenUsage};
    use docent_test_utils::{MockBackend, MockReply};

    use super::*;

    fn raw(text: &str, finish: FinishReason) -> RawGeneration {
        RawGeneration {
            text: text.to_string(),
            finish,
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
        }
    }

    #[test]
    fn non_empty_text_is_ok() {
        let outcome = interpret(Ok(raw("  Use `make deploy`.\n", FinishReason::Completed)));
        assert_eq!(outcome.status, OutcomeStatus::Ok);
        assert_eq!(outcome.text.as_deref(), Some("Use `make deploy`."));
        assert_eq!(outcome.usage.map(|u| u.output_tokens), Some(5));
    }

    #[test]
    fn non_empty_incomplete_text_is_still_ok() {
        let outcome = interpret(Ok(raw(
            "Partial answer",
            FinishReason::Incomplete {
                reason: Some("max_output_tokens".into()),
            },
        )));
        assert_eq!(outcome.status, OutcomeStatus::Ok);
    }

    #[test]
    fn empty_incomplete_is_truncated() {
        let outcome = interpret(Ok(raw(
            "",
            FinishReason::Incomplete {
                reason: Some("max_output_tokens".into()),
            },
        )));
        assert_eq!(outcome.status, OutcomeStatus::Truncated);
        assert!(outcome.text.is_none());
    }

    #[test]
    fn empty_complete_is_empty() {
        let outcome = interpret(Ok(raw(" \n ", FinishReason::Completed)));
        assert_eq!(outcome.status, OutcomeStatus::Empty);
    }

    #[test]
    fn backend_errors_keep_their_kind() {
        let outcome = interpret(Err(DocentError::generation(
            GenerationFailureKind::Quota,
            "rate limited",
        )));
        assert_eq!(outcome.status, OutcomeStatus::BackendError);
        let failure = outcome.error.unwrap();
        assert_eq!(failure.kind, GenerationFailureKind::Quota);
        assert_eq!(failure.detail, "rate limited");
    }

    #[tokio::test]
    async fn sends_instructions_corpus_and_limits() {
        let backend = Arc::new(MockBackend::with_replies(vec![MockReply::text("answer")]));
        let generator = ResponseGenerator::new(
            backend.clone(),
            "be brief",
            Duration::from_secs(5),
            256,
            10,
        );

        let outcome = generator.generate("how?", "vs_1", Vec::new()).await;
        assert_eq!(outcome.status, OutcomeStatus::Ok);

        let requests = backend.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instructions, "be brief");
        assert_eq!(requests[0].corpus_id, "vs_1");
        assert_eq!(requests[0].user_text, "how?");
        assert_eq!(requests[0].max_output_tokens, 256);
    }

    #[tokio::test]
    async fn history_is_bounded_to_most_recent_turns() {
        let backend = Arc::new(MockBackend::new());
        let generator =
            ResponseGenerator::new(backend.clone(), "", Duration::from_secs(5), 256, 2);
        let history = (0..5)
            .map(|i| HistoryTurn {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                text: format!("turn {i}"),
            })
            .collect();

        generator.generate("next", "vs_1", history).await;

        let sent = &backend.requests().await[0].history;
        let texts: Vec<&str> = sent.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["turn 3", "turn 4"]);
    }

    #[tokio::test(start_paused = true)]
    #[tracing_test::traced_test]
    async fn timeout_becomes_backend_error_without_retry() {
        let backend = Arc::new(MockBackend::with_replies(vec![MockReply::Hang]));
        let generator =
            ResponseGenerator::new(backend.clone(), "", Duration::from_secs(60), 256, 10);

        let outcome = generator.generate("slow?", "vs_1", Vec::new()).await;

        assert_eq!(outcome.status, OutcomeStatus::BackendError);
        assert_eq!(
            outcome.error.map(|e| e.kind),
            Some(GenerationFailureKind::Timeout)
        );
        assert_eq!(backend.call_count(), 1);
        assert!(logs_contain("generation backend failed"));
    }
}
