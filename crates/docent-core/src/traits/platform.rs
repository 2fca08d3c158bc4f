// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat platform trait: the outbound half of the team-chat integration.

use async_trait::async_trait;

use crate::error::DocentError;
use crate::traits::adapter::Adapter;
use crate::types::{HistoryTurn, MessageId, ReplyAction};

/// Outbound calls the assistant makes against the chat platform.
///
/// Every method may fail; failures surface as [`DocentError::Delivery`].
#[async_trait]
pub trait ChatPlatform: Adapter {
    /// Posts `text` visible to everyone in the thread rooted at `thread_root`.
    async fn post_public_reply(
        &self,
        channel_id: &str,
        thread_root: &str,
        text: &str,
    ) -> Result<MessageId, DocentError>;

    /// Posts `text` visible only to `user_id`, with optional interactive actions.
    async fn post_private_reply(
        &self,
        channel_id: &str,
        user_id: &str,
        text: &str,
        actions: &[ReplyAction],
    ) -> Result<MessageId, DocentError>;

    /// Replaces the content of a message previously posted by the assistant.
    async fn update_message(
        &self,
        channel_id: &str,
        message: &MessageId,
        text: &str,
    ) -> Result<(), DocentError>;

    /// Reads the latest `limit` turns of a thread, oldest first.
    ///
    /// The message with timestamp `exclude_timestamp` (the one being answered)
    /// is left out of the result.
    async fn read_thread_history(
        &self,
        channel_id: &str,
        thread_root: &str,
        exclude_timestamp: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, DocentError>;

    /// Resolves the assistant's own user id on the platform.
    async fn resolve_bot_identity(&self) -> Result<String, DocentError>;
}
