// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply pipeline for the Docent assistant.
//!
//! The [`Orchestrator`] is the entry point. For every inbound event it:
//! - Classifies the event against live conversation state
//! - Generates an answer grounded in the channel's corpus
//! - Filters unsolicited answers that lack confidence
//! - Delivers the reply, split into segments when needed
//! - Updates cooldown and active-thread state

pub mod delivery;
pub mod generator;
pub mod orchestrator;
pub mod state;
pub mod suppression;

pub use delivery::{DeliveryFormatter, Destination};
pub use generator::ResponseGenerator;
pub use orchestrator::{Collaborators, Disposition, Orchestrator};
pub use state::EngagementState;
pub use suppression::{ConfidenceFilter, SuppressReason};
