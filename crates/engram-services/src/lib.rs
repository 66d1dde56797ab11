// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP clients for the Engram model microservices.
//!
//! Three sentence-transformer services back the retrieval core: an
//! embedding service (`/vectorize`), an emotion classifier
//! (`/emotion-score`), and a cross-encoder reranker (`/rerank`). Each
//! exposes a `GET /health` probe. The embedding and emotion clients
//! memoize responses in size-bounded LRU caches.

mod http;

pub mod embedding;
pub mod emotion;
pub mod rerank;

pub use embedding::EmbeddingClient;
pub use emotion::EmotionClient;
pub use rerank::RerankClient;
