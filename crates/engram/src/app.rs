// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root: constructs and owns every collaborator.
//!
//! All clients are built here and injected explicitly; nothing is a
//! lazily-initialized global. Dropping the [`App`] (after `close`) tears
//! the whole pipeline down.

use std::sync::Arc;
use std::time::Duration;

use engram_agent::{AgentOrchestrator, RecallPipeline};
use engram_config::EngramConfig;
use engram_core::{
    ChatProvider, EmbeddingService, EmotionService, EngramError, RerankService, ServiceAdapter,
    VectorIndex,
};
use engram_memory::{
    ChunkIngestor, CognitiveReranker, DialogChunker, MemoryFormatter, MemoryRetriever,
};
use engram_ollama::OllamaClient;
use engram_services::{EmbeddingClient, EmotionClient, RerankClient};
use engram_storage::{Database, SessionLocks};
use engram_weaviate::WeaviateStore;

/// Fully wired Engram pipeline.
pub struct App {
    pub db: Database,
    pub ingestor: ChunkIngestor,
    pub agent: AgentOrchestrator,
    adapters: Vec<Arc<dyn ServiceAdapter>>,
}

impl App {
    /// Build every client and pipeline component from configuration.
    pub async fn build(config: &EngramConfig) -> Result<Self, EngramError> {
        let timeout = Duration::from_secs(config.services.request_timeout_secs);

        let embedding = Arc::new(EmbeddingClient::new(
            &config.services.embedding_url,
            config.services.cache_capacity,
            timeout,
        )?);
        let emotion = Arc::new(EmotionClient::new(
            &config.services.emotion_url,
            config.services.cache_capacity,
            timeout,
        )?);
        let rerank = Arc::new(RerankClient::new(&config.services.rerank_url, timeout)?);
        let store = Arc::new(WeaviateStore::new(
            &config.weaviate.url,
            &config.weaviate.collection,
            timeout,
        )?);
        let ollama = Arc::new(OllamaClient::new(
            &config.agent.chat_url,
            &config.agent.model,
            timeout,
        )?);

        let db = Database::open(&config.storage.database_path).await?;
        let locks = Arc::new(SessionLocks::new(Duration::from_millis(
            config.storage.lock_wait_ms,
        )));

        let chunker = DialogChunker::new(
            config.chunker.clone(),
            Arc::clone(&emotion) as Arc<dyn EmotionService>,
        );
        let ingestor = ChunkIngestor::new(
            db.clone(),
            chunker,
            Arc::clone(&embedding) as Arc<dyn EmbeddingService>,
            Arc::clone(&store) as Arc<dyn VectorIndex>,
            locks,
        );

        let reranker = CognitiveReranker::new(
            config.cognitive.clone(),
            Arc::clone(&rerank) as Arc<dyn RerankService>,
        );
        let retriever = MemoryRetriever::new(
            config.retrieval.clone(),
            Arc::clone(&embedding) as Arc<dyn EmbeddingService>,
            Arc::clone(&store) as Arc<dyn VectorIndex>,
            reranker,
        );
        let formatter = MemoryFormatter::new(config.formatter.clone());
        let recall = Arc::new(RecallPipeline::new(
            retriever,
            formatter,
            config.agent.memory_limit,
        ));
        let agent = AgentOrchestrator::new(
            Arc::clone(&ollama) as Arc<dyn ChatProvider>,
            recall,
            config.agent.clone(),
        );

        let adapters: Vec<Arc<dyn ServiceAdapter>> =
            vec![embedding, emotion, rerank, store, ollama];

        Ok(Self {
            db,
            ingestor,
            agent,
            adapters,
        })
    }

    /// Every external-service adapter, for health fan-out.
    pub fn adapters(&self) -> &[Arc<dyn ServiceAdapter>] {
        &self.adapters
    }

    /// Flush and close the relational store.
    pub async fn close(self) -> Result<(), EngramError> {
        self.db.close().await
    }
}
