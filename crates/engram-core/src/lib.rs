// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Engram dialog-memory system.
//!
//! This crate provides the error taxonomy, shared domain types, and the
//! adapter traits at the seams to external services (embedding, rerank,
//! emotion, chat, vector store). All service clients implement traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::EngramError;
pub use types::{
    Candidate, CandidateMetadata, ChatMessage, ChatOptions, ChatResponse, ChatResponseMessage,
    Chunk, ChunkProperties, EmotionGroupEntry, FormattedMemory, FusionKind, HealthStatus,
    HybridQuery, IngestResult, Message, RankedCandidate, RetrievalContext, RetrievalMetrics,
    RetrievalOutcome, RetrievalResult, Role, TemporalContext, ToolCall, ToolFunction, ToolSpec,
    ToolSpecFunction, TopChunk,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChatProvider, EmbeddingService, EmotionService, RerankService, ServiceAdapter, VectorIndex,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        // Verify all 8 error variants exist and can be constructed.
        let _config = EngramError::Config("test".into());
        let _missing = EngramError::InsufficientContext { field: "session_id" };
        let _storage = EngramError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _contention = EngramError::Contention {
            session_id: "test".into(),
            waited: std::time::Duration::from_secs(5),
        };
        let _partial = EngramError::PartialFailure { failed: 1, total: 3 };
        let _upstream = EngramError::upstream("embedding", "down");
        let _timeout = EngramError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        let _internal = EngramError::Internal("test".into());
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Verifies that every adapter trait compiles and is accessible
        // through the public API.
        fn _assert_service_adapter<T: ServiceAdapter>() {}
        fn _assert_embedding<T: EmbeddingService>() {}
        fn _assert_rerank<T: RerankService>() {}
        fn _assert_emotion<T: EmotionService>() {}
        fn _assert_chat<T: ChatProvider>() {}
        fn _assert_vector<T: VectorIndex>() {}
    }
}
