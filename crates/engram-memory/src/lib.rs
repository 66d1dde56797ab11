// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory pipeline for Engram: chunking, ingestion, retrieval,
//! cognitive reranking, and formatting of conversational memories.
//!
//! The write path ([`ChunkIngestor`]) windows unprocessed dialog into
//! overlapping chunks and delivers them to the vector store behind a
//! monotonic per-session watermark. The read path ([`MemoryRetriever`])
//! runs a session-scoped hybrid query, reranks candidates with the
//! multi-signal [`CognitiveReranker`], and [`MemoryFormatter`] projects
//! the winners into LLM-readable text.

pub mod chunker;
pub mod formatter;
pub mod ingestor;
pub mod reranker;
pub mod retriever;
pub mod splitter;

pub use chunker::DialogChunker;
pub use formatter::MemoryFormatter;
pub use ingestor::ChunkIngestor;
pub use reranker::CognitiveReranker;
pub use retriever::MemoryRetriever;
