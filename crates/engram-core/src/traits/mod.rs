// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the services Engram depends on.
//!
//! All adapters extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod chat;
pub mod embedding;
pub mod emotion;
pub mod rerank;
pub mod vector;

// Re-export all traits at the traits module level for convenience.
pub use adapter::ServiceAdapter;
pub use chat::ChatProvider;
pub use embedding::EmbeddingService;
pub use emotion::EmotionService;
pub use rerank::RerankService;
pub use vector::VectorIndex;
