// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preference storage for the Docent assistant.
//!
//! [`PreferenceStore`] serves per-user and per-channel settings from an
//! in-memory cache over any [`PreferencePersistence`](docent_core::PreferencePersistence).
//! [`FilePersistence`] is the directory-backed implementation used by the binary.

pub mod file;
pub mod store;

pub use file::FilePersistence;
pub use store::{CHANNELS_KEY, PreferenceStore, USERS_KEY};
