// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait for retrieval-augmented answer services.

use async_trait::async_trait;

use crate::error::DocentError;
use crate::traits::adapter::Adapter;
use crate::types::{GenerationRequest, RawGeneration};

/// A remote service that answers a question against a knowledge corpus.
///
/// Implementations return the backend's answer uninterpreted; classifying it
/// into an outcome is the caller's job. Errors should be
/// [`DocentError::Generation`] with the closest failure kind.
#[async_trait]
pub trait GenerationBackend: Adapter {
    async fn generate(&self, request: GenerationRequest) -> Result<RawGeneration, DocentError>;
}
