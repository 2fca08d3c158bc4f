// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Docent assistant.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Why a call to the generation backend failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureKind {
    /// The backend did not answer within the configured timeout.
    Timeout,
    /// Credentials were rejected.
    Auth,
    /// Rate limit or spending quota exhausted.
    Quota,
    /// Network or HTTP-level failure.
    Transport,
    /// The backend answered with something we could not interpret.
    Malformed,
}

/// The primary error type used across all Docent collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum DocentError {
    /// A channel or assistant is not configured for the requested operation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The generation backend failed (timeout, auth, quota, malformed response).
    #[error("generation backend error ({kind}): {message}")]
    Generation {
        kind: GenerationFailureKind,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The chat platform rejected or failed a post/update/read call.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Preference or state persistence failed.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DocentError {
    /// Builds a [`DocentError::Generation`] without an underlying source.
    pub fn generation(kind: GenerationFailureKind, message: impl Into<String>) -> Self {
        Self::Generation {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`DocentError::Delivery`] without an underlying source.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`DocentError::Persistence`] wrapping an I/O or codec error.
    pub fn persistence<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Static label used as the `category` field in structured logs.
    ///
    /// Backend failures and delivery failures need different operational
    /// responses, so they must never share a label.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Generation { .. } => "generation",
            Self::Delivery { .. } => "delivery",
            Self::Persistence { .. } => "persistence",
            Self::Timeout { .. } => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}
