// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement controls for the Docent assistant.
//!
//! - [`CooldownEngine`] throttles unsolicited replies per (channel, user).
//! - [`ActiveConversationTracker`] remembers threads the assistant recently
//!   answered in, so follow-ups there count as direct address.
//! - [`MemoryStateStore`] is the single-process TTL store behind the tracker.

pub mod active;
pub mod cooldown;
pub mod memory;

pub use active::ActiveConversationTracker;
pub use cooldown::CooldownEngine;
pub use memory::MemoryStateStore;
