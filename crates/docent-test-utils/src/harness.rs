// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a real [`Orchestrator`] to mock collaborators, a
//! manual clock and an in-memory state store, so whole event flows run
//! deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use docent_agent::{Collaborators, Disposition, Orchestrator};
use docent_config::DocentConfig;
use docent_core::clock::{Clock, ManualClock};
use docent_core::error::DocentError;
use docent_core::types::InboundEvent;
use docent_engage::MemoryStateStore;

use crate::mock_backend::{MockBackend, MockReply};
use crate::mock_persistence::MockPersistence;
use crate::mock_platform::MockPlatform;

/// Bot user id the harness platform reports.
pub const BOT_USER_ID: &str = "U0DOCENT";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: DocentConfig,
    replies: Vec<MockReply>,
    channels: Vec<(String, Option<String>)>,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = DocentConfig::default();
        // Keep platform call logs focused on replies unless a test opts in.
        config.delivery.show_thinking = false;
        Self {
            config,
            replies: Vec::new(),
            channels: Vec::new(),
            start: DateTime::<Utc>::UNIX_EPOCH + chrono::TimeDelta::days(20_000),
        }
    }

    pub fn with_config(mut self, config: DocentConfig) -> Self {
        self.config = config;
        self
    }

    /// Edits the default configuration in place.
    pub fn configure(mut self, edit: impl FnOnce(&mut DocentConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Set scripted backend results.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Subscribes `channel_id` before the harness is handed out.
    pub fn with_subscribed_channel(mut self, channel_id: &str, corpus_id: Option<&str>) -> Self {
        self.channels
            .push((channel_id.to_string(), corpus_id.map(str::to_string)));
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the harness and its orchestrator.
    pub async fn build(self) -> Result<TestHarness, DocentError> {
        let clock = Arc::new(ManualClock::new(self.start));
        let platform = Arc::new(MockPlatform::new(BOT_USER_ID));
        let backend = Arc::new(MockBackend::with_replies(self.replies));
        let persistence = Arc::new(MockPersistence::new());
        let state = Arc::new(MemoryStateStore::new(clock.clone()));

        let orchestrator = Orchestrator::new(
            self.config,
            Collaborators {
                platform: platform.clone(),
                backend: backend.clone(),
                persistence: persistence.clone(),
                state: state.clone(),
                clock: clock.clone(),
            },
        )
        .await?;
        orchestrator.start_sweeper(state.clone());

        for (channel_id, corpus_id) in self.channels {
            orchestrator
                .preferences()
                .subscribe_channel(&channel_id, corpus_id)
                .await;
        }

        Ok(TestHarness {
            orchestrator,
            platform,
            backend,
            persistence,
            state,
            clock,
            sequence: AtomicU64::new(0),
        })
    }
}

/// A complete test environment around a real orchestrator.
pub struct TestHarness {
    pub orchestrator: Orchestrator,
    pub platform: Arc<MockPlatform>,
    pub backend: Arc<MockBackend>,
    pub persistence: Arc<MockPersistence>,
    pub state: Arc<MemoryStateStore>,
    pub clock: Arc<ManualClock>,
    sequence: AtomicU64,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A fresh platform timestamp, unique within this harness.
    pub fn next_timestamp(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}.{seq:06}", self.clock.now().timestamp())
    }

    /// Root-channel message from `user_id`.
    pub fn message(&self, channel_id: &str, user_id: &str, text: &str) -> InboundEvent {
        InboundEvent::message(channel_id, user_id, text, self.next_timestamp())
    }

    /// Root-channel message from `user_id` that mentions the assistant.
    pub fn mention(&self, channel_id: &str, user_id: &str, text: &str) -> InboundEvent {
        self.message(channel_id, user_id, &format!("<@{BOT_USER_ID}> {text}"))
    }

    /// Reply in the thread rooted at `thread_root`.
    pub fn thread_reply(
        &self,
        channel_id: &str,
        user_id: &str,
        thread_root: &str,
        text: &str,
    ) -> InboundEvent {
        self.message(channel_id, user_id, text).in_thread(thread_root)
    }

    /// Handles `event` to completion.
    pub async fn handle(&self, event: InboundEvent) -> Disposition {
        self.orchestrator.handle(event).await
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_subscribed_channel() {
        let harness = TestHarness::builder()
            .with_subscribed_channel("C1", Some("vs_1"))
            .build()
            .await
            .unwrap();

        assert_eq!(harness.orchestrator.bot_user_id(), BOT_USER_ID);
        let channel = harness.orchestrator.preferences().channel("C1").await;
        assert!(channel.subscribed);
        assert_eq!(channel.corpus_id.as_deref(), Some("vs_1"));
    }

    #[tokio::test]
    async fn timestamps_are_unique() {
        let harness = TestHarness::builder().build().await.unwrap();
        let a = harness.next_timestamp();
        let b = harness.next_timestamp();
        assert_ne!(a, b);
    }
}
