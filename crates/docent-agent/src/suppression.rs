// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence filter for unsolicited replies.
//!
//! Ambient replies are biased toward silence: anything empty, truncated,
//! failed, or sounding like "I don't know" is dropped. Direct replies never
//! pass through here.

use docent_config::DocentConfig;
use docent_core::types::{GenerationOutcome, OutcomeStatus};
use docent_router::{DeclineHeuristic, TextHeuristic};
use strum::Display;

/// Why an ambient reply was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SuppressReason {
    Empty,
    Truncated,
    BackendError,
    /// The text reads like a refusal or an admission of not knowing.
    Declined,
}

/// Decides whether an ambient outcome is confident enough to post.
pub struct ConfidenceFilter {
    decline: Box<dyn TextHeuristic>,
}

impl ConfidenceFilter {
    pub fn new(decline: Box<dyn TextHeuristic>) -> Self {
        Self { decline }
    }

    pub fn from_config(config: &DocentConfig) -> Self {
        Self::new(Box::new(DeclineHeuristic::from_config(&config.heuristics)))
    }

    /// Returns the text to post, or why nothing should be posted.
    pub fn evaluate<'a>(&self, outcome: &'a GenerationOutcome) -> Result<&'a str, SuppressReason> {
        let text = match (outcome.status, outcome.usable_text()) {
            (OutcomeStatus::BackendError, _) => return Err(SuppressReason::BackendError),
            (_, Some(text)) => text,
            (OutcomeStatus::Truncated, None) => return Err(SuppressReason::Truncated),
            (_, None) => return Err(SuppressReason::Empty),
        };

        if self.decline.matches(text) {
            return Err(SuppressReason::Declined);
        }
        Ok(text)
    }
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self::new(Box::new(DeclineHeuristic::default()))
    }
}

impl std::fmt::Debug for ConfidenceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceFilter").finish_non_exhaustive()
    }
}
