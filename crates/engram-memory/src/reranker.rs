// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-signal cognitive reranking of hybrid-query candidates.
//!
//! Each candidate gets a composite of semantic, emotional, temporal, and
//! associative terms, scaled by a salience boost from the chunk's stored
//! cognitive weight. For a fixed query, candidate set, context, and clock
//! the output ordering is deterministic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use engram_config::model::CognitiveConfig;
use engram_core::{Candidate, RankedCandidate, RerankService, RetrievalContext};
use tracing::{debug, warn};

/// Cap on the salience boost multiplier.
const MAX_BOOST: f64 = 1.2;

/// Reranks candidates by composite cognitive relevance.
pub struct CognitiveReranker {
    rerank: Arc<dyn RerankService>,
    config: CognitiveConfig,
}

impl CognitiveReranker {
    pub fn new(config: CognitiveConfig, rerank: Arc<dyn RerankService>) -> Self {
        Self { rerank, config }
    }

    /// Rerank against the current clock.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        context: &RetrievalContext,
    ) -> Vec<RankedCandidate> {
        self.rerank_at(query, candidates, context, Utc::now()).await
    }

    /// Rerank against an explicit clock. Deterministic for fixed inputs.
    pub async fn rerank_at(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        context: &RetrievalContext,
        now: DateTime<Utc>,
    ) -> Vec<RankedCandidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let semantic_scores = self.semantic_scores(query, &candidates).await;

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(semantic_scores)
            .map(|(candidate, semantic)| {
                let emotional = self.emotional_term(&candidate, context);
                let temporal = temporal_term(&candidate, now);
                let associative = self.associative_term(&candidate, context);

                let base = self.config.semantic_weight * semantic
                    + self.config.emotional_weight * emotional
                    + self.config.temporal_weight * temporal
                    + self.config.associative_weight * associative;
                let score = base * self.salience_boost(candidate.properties.cognitive_weight);

                debug!(
                    chunk_id = %candidate.properties.chunk_id,
                    semantic,
                    emotional,
                    temporal,
                    associative,
                    score,
                    "cognitive score"
                );
                RankedCandidate {
                    score,
                    properties: candidate.properties,
                    metadata: candidate.metadata,
                }
            })
            .collect();

        // Stable sort keeps the store's order for tied scores.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Cross-encoder relevance of each candidate's content to the query.
    /// A reranker outage degrades every semantic term to 0.0 so the other
    /// signals still order the candidates.
    async fn semantic_scores(&self, query: &str, candidates: &[Candidate]) -> Vec<f64> {
        let pairs: Vec<(String, String)> = candidates
            .iter()
            .map(|c| (query.to_string(), c.properties.content.clone()))
            .collect();
        match self.rerank.score_pairs(&pairs).await {
            Ok(scores) if scores.len() == candidates.len() => scores,
            Ok(scores) => {
                warn!(
                    expected = candidates.len(),
                    got = scores.len(),
                    "reranker returned wrong score count, degrading semantic terms"
                );
                vec![0.0; candidates.len()]
            }
            Err(e) => {
                warn!(error = %e, "reranker failed, degrading semantic terms");
                vec![0.0; candidates.len()]
            }
        }
    }

    /// 1.0 unless the caller's emotion is set, the chunk carries emotion
    /// labels, and they disagree. An unlabeled chunk is neutral rather
    /// than a mismatch, mirroring how a missing caller emotion is treated.
    fn emotional_term(&self, candidate: &Candidate, context: &RetrievalContext) -> f64 {
        let Some(emotion) = context.emotion.as_deref() else {
            return 1.0;
        };
        let emotions = &candidate.properties.emotions;
        if emotions.is_empty() || emotions.iter().any(|e| e == emotion) {
            1.0
        } else {
            self.config.mismatch_score
        }
    }

    fn associative_term(&self, candidate: &Candidate, context: &RetrievalContext) -> f64 {
        let continues = match (
            candidate.properties.temporal_context.prev_chunk_id.as_deref(),
            context.last_chunk_id.as_deref(),
        ) {
            (Some(prev), Some(last)) => prev == last,
            _ => false,
        };
        if continues {
            self.config.continuity_score
        } else {
            1.0
        }
    }

    /// Non-linear boost for chunks above the salience threshold, capped.
    fn salience_boost(&self, cognitive_weight: f64) -> f64 {
        if cognitive_weight > self.config.weight_threshold {
            MAX_BOOST.min(1.0 + (cognitive_weight - self.config.weight_threshold) * 2.0)
        } else {
            1.0
        }
    }
}

/// Exponential recency decay with a 24-hour scale. Chunks without
/// timestamps score a neutral 1.0.
fn temporal_term(candidate: &Candidate, now: DateTime<Utc>) -> f64 {
    let Some(latest) = candidate.properties.timestamp.iter().max() else {
        return 1.0;
    };
    let hours = (now - *latest).num_milliseconds() as f64 / 3_600_000.0;
    (-hours.max(0.0) / 24.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use engram_core::{
        CandidateMetadata, ChunkProperties, EngramError, HealthStatus, ServiceAdapter,
        TemporalContext,
    };

    struct FakeRerank {
        scores: Vec<f64>,
        fail: bool,
    }

    impl FakeRerank {
        fn with(scores: &[f64]) -> Arc<Self> {
            Arc::new(Self {
                scores: scores.to_vec(),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                scores: Vec::new(),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl ServiceAdapter for FakeRerank {
        fn name(&self) -> &str {
            "fake-rerank"
        }
        async fn health_check(&self) -> Result<HealthStatus, EngramError> {
            Ok(HealthStatus::Healthy)
        }
    }

    #[async_trait]
    impl RerankService for FakeRerank {
        async fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f64>, EngramError> {
            if self.fail {
                return Err(EngramError::upstream("rerank", "down"));
            }
            Ok(self.scores.iter().copied().take(pairs.len()).collect())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn candidate(chunk_id: &str) -> Candidate {
        Candidate {
            id: chunk_id.to_string(),
            properties: ChunkProperties {
                chunk_id: chunk_id.to_string(),
                content: format!("User: about {chunk_id}"),
                emotions: Vec::new(),
                timestamp: vec![now()],
                temporal_context: TemporalContext::default(),
                cognitive_weight: 1.0,
            },
            metadata: CandidateMetadata::default(),
        }
    }

    fn reranker(rerank: Arc<FakeRerank>) -> CognitiveReranker {
        CognitiveReranker::new(CognitiveConfig::default(), rerank)
    }

    #[tokio::test]
    async fn orders_by_semantic_score() {
        let reranker = reranker(FakeRerank::with(&[0.2, 0.9, 0.5]));
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];
        let ranked = reranker
            .rerank_at("query", candidates, &RetrievalContext::default(), now())
            .await;

        let order: Vec<&str> = ranked.iter().map(|r| r.properties.chunk_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn is_deterministic_for_fixed_inputs() {
        let make = || vec![candidate("a"), candidate("b"), candidate("c")];
        let reranker = reranker(FakeRerank::with(&[0.4, 0.4, 0.4]));
        let ctx = RetrievalContext::default();

        let first = reranker.rerank_at("q", make(), &ctx, now()).await;
        let second = reranker.rerank_at("q", make(), &ctx, now()).await;
        let ids = |r: &[RankedCandidate]| {
            r.iter().map(|c| c.properties.chunk_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.score, b.score);
        }
    }

    #[tokio::test]
    async fn emotional_mismatch_lowers_the_score() {
        let reranker = reranker(FakeRerank::with(&[0.5, 0.5]));
        let mut matching = candidate("match");
        matching.properties.emotions = vec!["joy".to_string()];
        let mut mismatching = candidate("mismatch");
        mismatching.properties.emotions = vec!["anger".to_string()];

        let ctx = RetrievalContext {
            emotion: Some("joy".to_string()),
            ..RetrievalContext::default()
        };
        let ranked = reranker
            .rerank_at("q", vec![mismatching, matching], &ctx, now())
            .await;

        assert_eq!(ranked[0].properties.chunk_id, "match");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[tokio::test]
    async fn unlabeled_chunks_are_emotionally_neutral() {
        let reranker = reranker(FakeRerank::with(&[0.5, 0.5]));
        let unlabeled = candidate("unlabeled");
        let mut mismatching = candidate("mismatch");
        mismatching.properties.emotions = vec!["anger".to_string()];

        let ctx = RetrievalContext {
            emotion: Some("joy".to_string()),
            ..RetrievalContext::default()
        };
        let ranked = reranker
            .rerank_at("q", vec![mismatching, unlabeled], &ctx, now())
            .await;
        assert_eq!(ranked[0].properties.chunk_id, "unlabeled");
    }

    #[tokio::test]
    async fn recent_chunks_outrank_old_ones() {
        let reranker = reranker(FakeRerank::with(&[0.5, 0.5]));
        let recent = candidate("recent");
        let mut old = candidate("old");
        old.properties.timestamp = vec![now() - chrono::Duration::hours(72)];

        let ranked = reranker
            .rerank_at("q", vec![old, recent], &RetrievalContext::default(), now())
            .await;
        assert_eq!(ranked[0].properties.chunk_id, "recent");
    }

    #[tokio::test]
    async fn continuity_match_boosts_the_chunk() {
        let reranker = reranker(FakeRerank::with(&[0.5, 0.5]));
        let plain = candidate("plain");
        let mut continuing = candidate("continuing");
        continuing.properties.temporal_context.prev_chunk_id = Some("last-seen".to_string());

        let ctx = RetrievalContext {
            last_chunk_id: Some("last-seen".to_string()),
            ..RetrievalContext::default()
        };
        let ranked = reranker.rerank_at("q", vec![plain, continuing], &ctx, now()).await;
        assert_eq!(ranked[0].properties.chunk_id, "continuing");
    }

    #[tokio::test]
    async fn cognitive_weight_boost_is_monotonic_and_capped() {
        let reranker = reranker(FakeRerank::with(&[0.5]));
        assert_eq!(reranker.salience_boost(0.5), 1.0);
        assert_eq!(reranker.salience_boost(0.8), 1.0);

        let low = reranker.salience_boost(0.85);
        let high = reranker.salience_boost(0.9);
        assert!(low > 1.0);
        assert!(high > low);
        // Capped at 1.2 no matter how heavy the chunk is.
        assert_eq!(reranker.salience_boost(1.0), 1.2);
        assert_eq!(reranker.salience_boost(5.0), 1.2);
    }

    #[tokio::test]
    async fn reranker_outage_degrades_to_non_semantic_signals() {
        let reranker = reranker(FakeRerank::failing());
        let recent = candidate("recent");
        let mut old = candidate("old");
        old.properties.timestamp = vec![now() - chrono::Duration::hours(72)];

        let ranked = reranker
            .rerank_at("q", vec![old, recent], &RetrievalContext::default(), now())
            .await;
        assert_eq!(ranked.len(), 2);
        // Temporal signal still orders the results.
        assert_eq!(ranked[0].properties.chunk_id, "recent");
    }

    #[tokio::test]
    async fn empty_candidates_yield_empty_ranking() {
        let reranker = reranker(FakeRerank::with(&[]));
        let ranked = reranker
            .rerank_at("q", Vec::new(), &RetrievalContext::default(), now())
            .await;
        assert!(ranked.is_empty());
    }
}
