// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector-index adapter trait for chunk storage and hybrid retrieval.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EngramError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{Candidate, Chunk, HybridQuery};

/// Adapter for the vector store holding ingested dialog chunks.
#[async_trait]
pub trait VectorIndex: ServiceAdapter {
    /// Creates the backing collection if it does not already exist.
    async fn ensure_schema(&self) -> Result<(), EngramError>;

    /// Whether a chunk with this id is already stored.
    async fn exists(&self, id: &Uuid) -> Result<bool, EngramError>;

    /// Stores a chunk under its deterministic id with its embedding.
    async fn insert(&self, chunk: &Chunk, vector: &[f32]) -> Result<(), EngramError>;

    /// Runs a hybrid (vector + keyword) query and returns raw candidates
    /// in store order. An empty result is not an error.
    async fn hybrid(&self, query: &HybridQuery) -> Result<Vec<Candidate>, EngramError>;
}
