// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every external collaborator.

use async_trait::async_trait;

use crate::error::DocentError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, health, and lifecycle of an external collaborator.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Human-readable name of this collaborator instance.
    fn name(&self) -> &str;

    /// Semantic version of this collaborator.
    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the collaborator's current status.
    async fn health_check(&self) -> Result<HealthStatus, DocentError>;

    /// Releases any held resources.
    async fn shutdown(&self) -> Result<(), DocentError>;
}
