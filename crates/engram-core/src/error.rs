// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Engram memory core.

use thiserror::Error;

/// The primary error type used across all Engram components.
///
/// Absence of data is never an error: empty retrieval results and
/// up-to-date watermarks are modeled as ordinary return values. Every
/// variant here describes a genuine failure the caller must handle.
#[derive(Debug, Error)]
pub enum EngramError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A caller omitted a required field. Fails fast, no partial work
    /// is attempted.
    #[error("insufficient context: missing required field `{field}`")]
    InsufficientContext { field: &'static str },

    /// Relational storage errors (connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A session-scoped lock could not be acquired within the bounded
    /// wait. Retryable by the caller.
    #[error("lock contention for session {session_id} after {waited:?}")]
    Contention {
        session_id: String,
        waited: std::time::Duration,
    },

    /// Some but not all sub-operations of a batch failed. Shared state
    /// was left untouched, so the whole batch is retryable.
    #[error("partial failure: {failed} of {total} batch operations failed")]
    PartialFailure { failed: usize, total: usize },

    /// A collaborator service (embedding, reranker, emotion, vector
    /// store, chat model) did not respond or responded with an error.
    #[error("upstream service `{service}` failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation exceeded its enforced deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngramError {
    /// Shorthand for an [`EngramError::Upstream`] without a source.
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
            source: None,
        }
    }
}
