// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-encoder rerank adapter trait.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::traits::adapter::ServiceAdapter;

/// Adapter for cross-encoder relevance scoring of (query, document) pairs.
#[async_trait]
pub trait RerankService: ServiceAdapter {
    /// Scores each pair, returning one relevance score per pair in input
    /// order. Scores are model-defined; callers treat them as opaque
    /// comparable values.
    async fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f64>, EngramError>;
}
