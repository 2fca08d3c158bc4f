// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Docent integration tests.
//!
//! Provides mock collaborators and a fully wired harness for fast,
//! deterministic tests without a chat platform or generation service.
//!
//! # Components
//!
//! - [`MockPlatform`] - Records every platform call, with failure injection
//! - [`MockBackend`] - Scripted generation results and a call counter
//! - [`MockPersistence`] - In-memory preference documents
//! - [`TestHarness`] - Builder for an [`Orchestrator`](docent_agent::Orchestrator) over the mocks

pub mod harness;
pub mod mock_backend;
pub mod mock_persistence;
pub mod mock_platform;

pub use docent_core::clock::ManualClock;
pub use harness::{BOT_USER_ID, TestHarness, TestHarnessBuilder};
pub use mock_backend::{MockBackend, MockReply};
pub use mock_persistence::MockPersistence;
pub use mock_platform::{MessageUpdate, MockPlatform, PlatformCall, PrivateReply, PublicReply};
