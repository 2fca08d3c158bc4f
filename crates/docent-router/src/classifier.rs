// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event classification.
//!
//! One event in, one terminal [`Classification`] out. The classifier keeps no
//! state of its own; everything it needs to know about the conversation comes
//! from a [`ConversationState`] snapshot, so classifying the same event twice
//! against the same state yields the same answer.

use async_trait::async_trait;
use docent_config::DocentConfig;
use docent_core::types::{EventKind, InboundEvent};
use strum::Display;
use tracing::debug;

use crate::heuristics::{QuestionHeuristic, TextHeuristic};
use crate::mention::AddressDetector;

/// Message subtypes that still carry a user-authored message.
const USER_SUBTYPES: &[&str] = &["thread_broadcast", "file_share"];

/// Read-only view of conversation state needed to classify an event.
#[async_trait]
pub trait ConversationState: Send + Sync {
    /// Has the assistant replied in this thread within the active TTL?
    async fn is_thread_active(&self, channel_id: &str, thread_root: &str) -> bool;

    async fn channel_subscribed(&self, channel_id: &str) -> bool;

    /// Would an ambient reply to this user in this channel respect the cooldown?
    async fn cooldown_allows(&self, channel_id: &str, user_id: &str) -> bool;

    /// Has the user opted out of ambient replies?
    async fn user_silenced(&self, user_id: &str) -> bool;
}

/// Why an event needs no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    FromBot,
    SystemSubtype,
    UnsupportedEvent,
    UnrelatedReaction,
    EmptyText,
    InactiveThread,
    NotSubscribed,
    NotAQuestion,
    CooldownActive,
    OptedOut,
}

/// What made a message a direct request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DirectTrigger {
    /// The message names the assistant.
    Mention,
    /// The message follows up in a thread the assistant is active in.
    ActiveThread,
}

/// Terminal outcome of classifying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Ignore(IgnoreReason),
    /// Feedback reaction on one of the assistant's messages.
    FeedbackPrompt {
        /// Assistant message that received the reaction.
        message_timestamp: String,
    },
    /// Public reply in the thread rooted at `thread_root`.
    DirectReply {
        thread_root: String,
        trigger: DirectTrigger,
    },
    /// Private reply visible only to the author of a root-channel message.
    AmbientReply,
}

impl Classification {
    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignore(_) => "ignore",
            Self::FeedbackPrompt { .. } => "feedback_prompt",
            Self::DirectReply { .. } => "direct_reply",
            Self::AmbientReply => "ambient_reply",
        }
    }
}

/// Classifies inbound events for one assistant identity.
pub struct EventClassifier {
    address: AddressDetector,
    question: Box<dyn TextHeuristic>,
    feedback_reaction: String,
}

impl EventClassifier {
    pub fn new(
        address: AddressDetector,
        question: Box<dyn TextHeuristic>,
        feedback_reaction: impl Into<String>,
    ) -> Self {
        Self {
            address,
            question,
            feedback_reaction: feedback_reaction.into(),
        }
    }

    /// Builds a classifier with the configured aliases, word lists and trigger.
    pub fn from_config(bot_user_id: impl Into<String>, config: &DocentConfig) -> Self {
        Self::new(
            AddressDetector::new(bot_user_id, &config.assistant.address_aliases),
            Box::new(QuestionHeuristic::from_config(&config.heuristics)),
            config.feedback.reaction.clone(),
        )
    }

    /// Replaces the question-likeness strategy.
    pub fn with_question_heuristic(mut self, question: Box<dyn TextHeuristic>) -> Self {
        self.question = question;
        self
    }

    pub fn address(&self) -> &AddressDetector {
        &self.address
    }

    /// Text to send to the generation backend: the message without mentions.
    pub fn prompt_text(&self, event: &InboundEvent) -> String {
        self.address.strip(&event.text)
    }

    /// Classifies one event against the current conversation state.
    pub async fn classify(
        &self,
        event: &InboundEvent,
        state: &dyn ConversationState,
    ) -> Classification {
        let classification = self.classify_inner(event, state).await;
        debug!(
            channel = %event.channel_id,
            user = %event.user_id,
            ts = %event.timestamp,
            classification = classification.label(),
            reason = ?classification,
            "event classified"
        );
        classification
    }

    async fn classify_inner(
        &self,
        event: &InboundEvent,
        state: &dyn ConversationState,
    ) -> Classification {
        if event.is_from_bot || event.user_id == self.address.bot_user_id() {
            return Classification::Ignore(IgnoreReason::FromBot);
        }
        if let Some(subtype) = &event.subtype
            && !USER_SUBTYPES.contains(&subtype.as_str())
        {
            return Classification::Ignore(IgnoreReason::SystemSubtype);
        }

        match event.kind {
            EventKind::Reaction => return self.classify_reaction(event),
            EventKind::Other => return Classification::Ignore(IgnoreReason::UnsupportedEvent),
            EventKind::Message => {}
        }

        if self.prompt_text(event).is_empty() {
            return Classification::Ignore(IgnoreReason::EmptyText);
        }

        if self.address.is_addressed(&event.text) {
            return Classification::DirectReply {
                thread_root: event.reply_thread_root().to_string(),
                trigger: DirectTrigger::Mention,
            };
        }

        if let Some(root) = event.thread_root() {
            return if state.is_thread_active(&event.channel_id, root).await {
                Classification::DirectReply {
                    thread_root: root.to_string(),
                    trigger: DirectTrigger::ActiveThread,
                }
            } else {
                Classification::Ignore(IgnoreReason::InactiveThread)
            };
        }

        if !state.channel_subscribed(&event.channel_id).await {
            return Classification::Ignore(IgnoreReason::NotSubscribed);
        }
        if !self.question.matches(&event.text) {
            return Classification::Ignore(IgnoreReason::NotAQuestion);
        }
        if !state.cooldown_allows(&event.channel_id, &event.user_id).await {
            return Classification::Ignore(IgnoreReason::CooldownActive);
        }
        if state.user_silenced(&event.user_id).await {
            return Classification::Ignore(IgnoreReason::OptedOut);
        }

        Classification::AmbientReply
    }

    fn classify_reaction(&self, event: &InboundEvent) -> Classification {
        let on_own_message = event.item_user_id.as_deref() == Some(self.address.bot_user_id());
        let is_trigger = event
            .reaction
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(&self.feedback_reaction));

        match (&event.item_timestamp, on_own_message && is_trigger) {
            (Some(ts), true) => Classification::FeedbackPrompt {
                message_timestamp: ts.clone(),
            },
            _ => Classification::Ignore(IgnoreReason::UnrelatedReaction),
        }
    }
}

impl std::fmt::Debug for EventClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClassifier")
            .field("address", &self.address)
            .field("feedback_reaction", &self.feedback_reaction)
            .finish_non_exhaustive()
    }
}
