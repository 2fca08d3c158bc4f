// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived key/value state with per-key expiry.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DocentError;

/// Key/value store with optional time-to-live per entry.
///
/// Used for conversation activity markers. Implementations may live in
/// process memory or in an external cache.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Returns the value if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, DocentError>;

    /// Stores a value. `ttl: None` keeps it until deleted.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
    -> Result<(), DocentError>;

    async fn delete(&self, key: &str) -> Result<(), DocentError>;
}
