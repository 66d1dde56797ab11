// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weaviate vector-store client for Engram dialog chunks.
//!
//! Implements the `VectorIndex` seam over Weaviate's REST and GraphQL
//! APIs: collection bootstrap, deterministic-id existence checks, vector
//! inserts, and session-scoped hybrid queries with relative-score fusion.

pub mod schema;
pub mod store;

pub use store::WeaviateStore;
