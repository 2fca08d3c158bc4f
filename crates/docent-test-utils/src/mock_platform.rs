// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat platform for deterministic testing.
//!
//! `MockPlatform` implements `ChatPlatform`, records every call in order and
//! can be told to fail outbound calls.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use docent_core::error::DocentError;
use docent_core::traits::{Adapter, ChatPlatform};
use docent_core::types::{AdapterType, HealthStatus, HistoryTurn, MessageId, ReplyAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicReply {
    pub id: MessageId,
    pub channel_id: String,
    pub thread_root: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateReply {
    pub id: MessageId,
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
    pub actions: Vec<ReplyAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUpdate {
    pub channel_id: String,
    pub message: MessageId,
    pub text: String,
}

/// One successful call made against the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Public(PublicReply),
    Private(PrivateReply),
    Update(MessageUpdate),
    ReadHistory {
        channel_id: String,
        thread_root: String,
        exclude_timestamp: String,
        limit: usize,
    },
}

/// A mock chat platform.
///
/// Outbound calls (public posts, private posts, updates) succeed unless
/// failures are injected with [`fail_next_posts`](Self::fail_next_posts) or
/// [`fail_all_posts`](Self::fail_all_posts). Failed calls are counted but not
/// recorded.
pub struct MockPlatform {
    bot_user_id: String,
    calls: Mutex<Vec<PlatformCall>>,
    history: Mutex<Vec<HistoryTurn>>,
    fail_next: AtomicUsize,
    fail_all: AtomicBool,
    fail_history: AtomicBool,
    failed: AtomicUsize,
}

impl MockPlatform {
    pub fn new(bot_user_id: impl Into<String>) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            calls: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            fail_next: AtomicUsize::new(0),
            fail_all: AtomicBool::new(false),
            fail_history: AtomicBool::new(false),
            failed: AtomicUsize::new(0),
        }
    }

    /// Turns returned by `read_thread_history`, oldest first.
    pub async fn set_history(&self, turns: Vec<HistoryTurn>) {
        *self.history.lock().await = turns;
    }

    /// Fails the next `n` outbound calls.
    pub fn fail_next_posts(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Fails every outbound call while `fail` is true.
    pub fn fail_all_posts(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    /// Number of calls that failed by injection.
    pub fn failed_calls(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub async fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().await.clone()
    }

    pub async fn public_replies(&self) -> Vec<PublicReply> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Public(reply) => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn private_replies(&self) -> Vec<PrivateReply> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Private(reply) => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn updates(&self) -> Vec<MessageUpdate> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Update(update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count of public posts, private posts and updates that succeeded.
    pub async fn outbound_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| !matches!(call, PlatformCall::ReadHistory { .. }))
            .count()
    }

    pub async fn clear(&self) {
        self.calls.lock().await.clear();
    }

    fn check_outbound(&self, what: &str) -> Result<(), DocentError> {
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected || self.fail_all.load(Ordering::SeqCst) {
            self.failed.fetch_add(1, Ordering::SeqCst);
            return Err(DocentError::delivery(format!("mock platform rejected {what}")));
        }
        Ok(())
    }

    fn new_id() -> MessageId {
        MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4()))
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new("U0DOCENT")
    }
}

#[async_trait]
impl Adapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ChatPlatform
    }

    async fn health_check(&self) -> Result<HealthStatus, DocentError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded("outbound calls failing".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocentError> {
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn post_public_reply(
        &self,
        channel_id: &str,
        thread_root: &str,
        text: &str,
    ) -> Result<MessageId, DocentError> {
        self.check_outbound("public reply")?;
        let id = Self::new_id();
        self.calls.lock().await.push(PlatformCall::Public(PublicReply {
            id: id.clone(),
            channel_id: channel_id.to_string(),
            thread_root: thread_root.to_string(),
            text: text.to_string(),
        }));
        Ok(id)
    }

    async fn post_private_reply(
        &self,
        channel_id: &str,
        user_id: &str,
        text: &str,
        actions: &[ReplyAction],
    ) -> Result<MessageId, DocentError> {
        self.check_outbound("private reply")?;
        let id = Self::new_id();
        self.calls.lock().await.push(PlatformCall::Private(PrivateReply {
            id: id.clone(),
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            actions: actions.to_vec(),
        }));
        Ok(id)
    }

    async fn update_message(
        &self,
        channel_id: &str,
        message: &MessageId,
        text: &str,
    ) -> Result<(), DocentError> {
        self.check_outbound("message update")?;
        self.calls.lock().await.push(PlatformCall::Update(MessageUpdate {
            channel_id: channel_id.to_string(),
            message: message.clone(),
            text: text.to_string(),
        }));
        Ok(())
    }

    async fn read_thread_history(
        &self,
        channel_id: &str,
        thread_root: &str,
        exclude_timestamp: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, DocentError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(DocentError::delivery("mock platform history unavailable"));
        }
        self.calls.lock().await.push(PlatformCall::ReadHistory {
            channel_id: channel_id.to_string(),
            thread_root: thread_root.to_string(),
            exclude_timestamp: exclude_timestamp.to_string(),
            limit,
        });
        let history = self.history.lock().await;
        let skip = history.len().saturating_sub(limit);
        Ok(history[skip..].to_vec())
    }

    async fn resolve_bot_identity(&self) -> Result<String, DocentError> {
        Ok(self.bot_user_id.clone())
    }
}
