// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Every external collaborator extends the [`Adapter`] base trait and uses
//! `#[async_trait]` so it can be held as `Arc<dyn ...>`.

pub mod adapter;
pub mod backend;
pub mod persistence;
pub mod platform;
pub mod state;

pub use adapter::Adapter;
pub use backend::GenerationBackend;
pub use persistence::PreferencePersistence;
pub use platform::ChatPlatform;
pub use state::StateStore;
