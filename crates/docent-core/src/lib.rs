// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Docent assistant.
//!
//! Provides the collaborator traits, error types, and domain types shared by
//! the classifier, the engagement controls, and the orchestrator.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DocentError, GenerationFailureKind};
pub use types::{
    AdapterType, ChannelPreference, ChannelPreferenceUpdate, EventKind, FeedbackSubmission,
    FinishReason, GenerationFailure, GenerationOutcome, GenerationRequest, HealthStatus,
    HistoryTurn, InboundEvent, MessageId, OutcomeStatus, RawGeneration, ReplyAction, Role,
    TokenUsage, UserPreference, UserPreferenceUpdate,
};

pub use traits::{Adapter, ChatPlatform, GenerationBackend, PreferencePersistence, StateStore};
