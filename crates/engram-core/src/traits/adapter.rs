// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all external-service adapters.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::types::HealthStatus;

/// Base trait for every adapter that fronts an external service.
///
/// Every adapter (embedding, rerank, emotion, chat, vector index)
/// implements this trait, which provides identity and health checking.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the service's current status.
    async fn health_check(&self) -> Result<HealthStatus, EngramError>;
}
