// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::traits::adapter::ServiceAdapter;

/// Adapter for generating vector embeddings from text.
///
/// Embedding adapters power the vector leg of hybrid retrieval by
/// converting chunk content and queries into vector representations.
#[async_trait]
pub trait EmbeddingService: ServiceAdapter {
    /// Generates one embedding per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngramError>;
}
