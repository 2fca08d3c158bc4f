// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event classification for the Docent assistant.
//!
//! Maps every inbound platform event to exactly one terminal
//! [`Classification`]. Conversation state (active threads, subscriptions,
//! cooldowns, opt-outs) is read through the [`ConversationState`] trait, and
//! the text heuristics are swappable [`TextHeuristic`] strategies.

pub mod classifier;
pub mod heuristics;
pub mod mention;

pub use classifier::{
    Classification, ConversationState, DirectTrigger, EventClassifier, IgnoreReason,
};
pub use heuristics::{DeclineHeuristic, QuestionHeuristic, TextHeuristic};
pub use mention::AddressDetector;
