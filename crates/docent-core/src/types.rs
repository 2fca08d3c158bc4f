// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the classifier, the orchestrator, and the collaborator traits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GenerationFailureKind;

/// Identifier of a message posted through the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but experiencing issues.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an [`Adapter`](crate::traits::Adapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    ChatPlatform,
    GenerationBackend,
    PreferencePersistence,
}

/// Kind of inbound platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    Reaction,
    Other,
}

/// An event delivered by the chat platform's inbound endpoint.
///
/// Read-only from the core's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub channel_id: String,
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    /// Platform timestamp of the message (or of the reaction).
    pub timestamp: String,
    #[serde(default)]
    pub thread_root_timestamp: Option<String>,
    #[serde(default)]
    pub is_from_bot: bool,
    /// Edits, joins, and other system messages carry a subtype.
    #[serde(default)]
    pub subtype: Option<String>,
    /// Reaction name, for [`EventKind::Reaction`].
    #[serde(default)]
    pub reaction: Option<String>,
    /// Author of the message a reaction was added to.
    #[serde(default)]
    pub item_user_id: Option<String>,
    /// Timestamp of the message a reaction was added to.
    #[serde(default)]
    pub item_timestamp: Option<String>,
}

impl InboundEvent {
    /// Builds a plain root-channel message event.
    pub fn message(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Message,
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            text: text.into(),
            timestamp: timestamp.into(),
            thread_root_timestamp: None,
            is_from_bot: false,
            subtype: None,
            reaction: None,
            item_user_id: None,
            item_timestamp: None,
        }
    }

    /// Places this message inside the thread rooted at `root`.
    pub fn in_thread(mut self, root: impl Into<String>) -> Self {
        self.thread_root_timestamp = Some(root.into());
        self
    }

    /// Builds a reaction event on the message `item_timestamp` authored by `item_user_id`.
    pub fn reaction(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        reaction: impl Into<String>,
        item_user_id: impl Into<String>,
        item_timestamp: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Reaction,
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            text: String::new(),
            timestamp: timestamp.into(),
            thread_root_timestamp: None,
            is_from_bot: false,
            subtype: None,
            reaction: Some(reaction.into()),
            item_user_id: Some(item_user_id.into()),
            item_timestamp: Some(item_timestamp.into()),
        }
    }

    /// Thread root of a reply, or `None` for root-channel messages.
    ///
    /// Some platforms stamp a thread parent with its own timestamp as the
    /// thread root; such a message is still a root message.
    pub fn thread_root(&self) -> Option<&str> {
        self.thread_root_timestamp
            .as_deref()
            .filter(|root| *root != self.timestamp)
    }

    /// Thread a public reply to this event belongs in: the existing thread,
    /// or a new thread rooted at this message.
    pub fn reply_thread_root(&self) -> &str {
        self.thread_root().unwrap_or(&self.timestamp)
    }
}

/// Speaker of a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn of a thread, oldest first when in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

/// Token accounting reported by the generation backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A single request to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub history: Vec<HistoryTurn>,
    pub user_text: String,
    pub corpus_id: String,
    pub max_output_tokens: u32,
}

/// How the backend finished producing its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Normal completion.
    Completed,
    /// Stopped early, typically at the output-token limit.
    Incomplete { reason: Option<String> },
}

/// Uninterpreted answer from the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGeneration {
    pub text: String,
    pub finish: FinishReason,
    pub usage: Option<TokenUsage>,
}

/// Normalized status of a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Empty,
    Truncated,
    BackendError,
}

/// Diagnostic detail attached to a [`OutcomeStatus::BackendError`] outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub kind: GenerationFailureKind,
    pub detail: String,
}

/// Uniform result of the Response Generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub status: OutcomeStatus,
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
    pub error: Option<GenerationFailure>,
}

impl GenerationOutcome {
    pub fn ok(text: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            text: Some(text.into()),
            usage,
            error: None,
        }
    }

    pub fn empty(usage: Option<TokenUsage>) -> Self {
        Self {
            status: OutcomeStatus::Empty,
            text: None,
            usage,
            error: None,
        }
    }

    pub fn truncated(usage: Option<TokenUsage>) -> Self {
        Self {
            status: OutcomeStatus::Truncated,
            text: None,
            usage,
            error: None,
        }
    }

    pub fn backend_error(kind: GenerationFailureKind, detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::BackendError,
            text: None,
            usage: None,
            error: Some(GenerationFailure {
                kind,
                detail: detail.into(),
            }),
        }
    }

    /// Text that is worth showing to a user, if any.
    pub fn usable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Interactive action attached to a private reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyAction {
    /// Re-post this private answer publicly in the thread rooted at `thread_root`.
    PromoteToThread { thread_root: String },
    /// Open the feedback form for the assistant message `message_timestamp`.
    OpenFeedbackForm { message_timestamp: String },
}

/// Feedback filed through the platform's form dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub channel_id: String,
    pub message_timestamp: String,
    pub category: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Per-user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Opted out of ambient (unsolicited) replies.
    pub silenced: bool,
    /// Overrides the global cooldown; `Some(0)` disables throttling.
    #[serde(default)]
    pub custom_cooldown_secs: Option<u64>,
    /// Last ambient reply per channel.
    #[serde(default)]
    pub last_response_at: HashMap<String, DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    /// Default preference for a user seen for the first time.
    pub fn new_default(ambient_enabled: bool, now: DateTime<Utc>) -> Self {
        Self {
            silenced: !ambient_enabled,
            custom_cooldown_secs: None,
            last_response_at: HashMap::new(),
            updated_at: now,
        }
    }
}

/// Per-channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreference {
    pub subscribed: bool,
    /// Knowledge corpus bound to this channel; `None` means untrained.
    #[serde(default)]
    pub corpus_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelPreference {
    pub fn new_default(now: DateTime<Utc>) -> Self {
        Self {
            subscribed: false,
            corpus_id: None,
            updated_at: now,
        }
    }
}

/// Partial update applied to a [`UserPreference`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPreferenceUpdate {
    pub silenced: Option<bool>,
    /// `Some(None)` clears the override.
    pub custom_cooldown_secs: Option<Option<u64>>,
    /// Records an ambient reply in `(channel, at)`.
    pub last_response: Option<(String, DateTime<Utc>)>,
}

/// Partial update applied to a [`ChannelPreference`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPreferenceUpdate {
    pub subscribed: Option<bool>,
    /// `Some(None)` unbinds the corpus.
    pub corpus_id: Option<Option<String>>,
}
