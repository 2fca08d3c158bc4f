// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key/document persistence used by the preference store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DocentError;
use crate::traits::adapter::Adapter;

/// Blob storage addressed by a short key (for example `users.json`).
#[async_trait]
pub trait PreferencePersistence: Adapter {
    /// Reads a document. `Ok(None)` means it has never been written.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, DocentError>;

    /// Replaces a document atomically.
    async fn write(&self, key: &str, contents: &[u8]) -> Result<(), DocentError>;

    /// Last modification time of a document, if it exists.
    async fn last_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, DocentError>;
}
