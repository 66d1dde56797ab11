// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retrieval over the vector store, with cognitive reranking.

use std::collections::BTreeMap;
use std::sync::Arc;

use engram_config::model::RetrievalConfig;
use engram_core::{
    EmbeddingService, EmotionGroupEntry, EngramError, FusionKind, HybridQuery, RankedCandidate,
    RetrievalContext, RetrievalMetrics, RetrievalOutcome, RetrievalResult, TopChunk, VectorIndex,
};
use tracing::{debug, info};

use crate::reranker::CognitiveReranker;

/// Retrieves session-scoped memories by hybrid query and reranks them.
pub struct MemoryRetriever {
    config: RetrievalConfig,
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    reranker: CognitiveReranker,
}

impl MemoryRetriever {
    pub fn new(
        config: RetrievalConfig,
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        reranker: CognitiveReranker,
    ) -> Self {
        Self {
            config,
            embedding,
            index,
            reranker,
        }
    }

    /// Retrieve memories relevant to `query` within the session named by
    /// `context`. An empty result is a normal outcome, not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        context: &RetrievalContext,
    ) -> Result<RetrievalResult, EngramError> {
        // Fail fast before any external call.
        let session_id = context
            .session_id
            .ok_or(EngramError::InsufficientContext { field: "session_id" })?;

        let top_k = context.top_k.unwrap_or(self.config.top_k);
        debug!(session_id = %session_id, top_k, "retrieving memories");

        let vectors = self.embedding.embed(&[query.to_string()]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EngramError::Internal("embedding returned no vector".to_string()))?;

        let candidates = self
            .index
            .hybrid(&HybridQuery {
                query: query.to_string(),
                vector,
                alpha: self.config.alpha,
                fusion: FusionKind::RelativeScore,
                limit: top_k,
                session_id,
            })
            .await?;

        if candidates.is_empty() {
            info!(session_id = %session_id, "no candidates for query");
            return Ok(RetrievalResult::not_found("Memory not found"));
        }
        let initial_candidates = candidates.len();

        let ranked = self.reranker.rerank(query, candidates, context).await;
        if ranked.is_empty() {
            return Ok(RetrievalResult::not_found(
                "No cognitively relevant memory found",
            ));
        }

        info!(
            session_id = %session_id,
            candidates = initial_candidates,
            ranked = ranked.len(),
            "memories retrieved"
        );
        Ok(self.assemble(ranked, initial_candidates, top_k))
    }

    fn assemble(
        &self,
        ranked: Vec<RankedCandidate>,
        initial_candidates: usize,
        top_k: usize,
    ) -> RetrievalResult {
        let top_chunks = ranked
            .iter()
            .take(self.config.top_chunks)
            .map(|r| TopChunk {
                content: r.properties.content.clone(),
                cognitive_score: r.score,
                emotions: r.properties.emotions.clone(),
                latest_timestamp: r.properties.timestamp.iter().max().copied(),
            })
            .collect();

        let mut emotion_groups: BTreeMap<String, Vec<EmotionGroupEntry>> = BTreeMap::new();
        for r in ranked.iter().take(self.config.group_window) {
            let primary = r
                .properties
                .emotions
                .first()
                .cloned()
                .unwrap_or_else(|| "neutral".to_string());
            emotion_groups.entry(primary).or_default().push(EmotionGroupEntry {
                content: r.properties.content.clone(),
                score: r.score,
                latest_timestamp: r.properties.timestamp.iter().max().copied(),
                associative_link: r.properties.temporal_context.prev_chunk_id.clone(),
            });
        }

        let scored = ranked.iter().take(top_k);
        let count = scored.clone().count();
        let mean_cognitive_score = if count == 0 {
            0.0
        } else {
            scored.map(|r| r.score).sum::<f64>() / count as f64
        };

        RetrievalResult {
            outcome: RetrievalOutcome::Found,
            top_chunks,
            emotion_groups,
            metrics: Some(RetrievalMetrics {
                initial_candidates,
                mean_cognitive_score,
                retention_days: self.config.retention_days,
            }),
            description: "Memory found".to_string(),
            ranked,
        }
    }
}
