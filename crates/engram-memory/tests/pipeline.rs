// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: append messages, ingest them into a fake
//! vector store, retrieve them back, and format the winners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use engram_config::model::{
    ChunkerConfig, CognitiveConfig, FormatterConfig, RetrievalConfig,
};
use engram_core::{
    Candidate, CandidateMetadata, Chunk, ChunkProperties, EmbeddingService, EmotionService,
    EngramError, HealthStatus, HybridQuery, IngestResult, RerankService, RetrievalContext,
    RetrievalOutcome, Role, ServiceAdapter, VectorIndex,
};
use engram_memory::{
    ChunkIngestor, CognitiveReranker, DialogChunker, MemoryFormatter, MemoryRetriever,
};
use engram_storage::{queries, Database, IngestionWatermark, SessionLocks};
use tempfile::tempdir;
use uuid::Uuid;

struct FakeEmbedding;

#[async_trait]
impl ServiceAdapter for FakeEmbedding {
    fn name(&self) -> &str {
        "fake-embedding"
    }
    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngramError> {
        Ok(texts.iter().map(|_| vec![0.1, 0.9]).collect())
    }
}

struct FakeEmotion;

#[async_trait]
impl ServiceAdapter for FakeEmotion {
    fn name(&self) -> &str {
        "fake-emotion"
    }
    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmotionService for FakeEmotion {
    async fn label(&self, _text: &str) -> Result<Vec<String>, EngramError> {
        Ok(vec!["fear".to_string()])
    }
}

struct FakeRerank;

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
        // Score by naive keyword hit so retrieval order is predictable.
        Ok(pairs
            .iter()
            .map(|(query, doc)| if doc.contains(query.as_str()) { 0.9 } else { 0.2 })
            .collect())
    }
}

/// In-memory vector store; hybrid returns the session's chunks verbatim.
#[derive(Default)]
struct MemoryIndex {
    objects: Mutex<HashMap<Uuid, Chunk>>,
    inserts: AtomicUsize,
    fail_on_insert: Option<usize>,
}

#[async_trait]
impl ServiceAdapter for MemoryIndex {
    fn name(&self) -> &str {
        "memory-index"
    }
    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_schema(&self) -> Result<(), EngramError> {
        Ok(())
    }

    async fn exists(&self, id: &Uuid) -> Result<bool, EngramError> {
        Ok(self.objects.lock().unwrap().contains_key(id))
    }

    async fn insert(&self, chunk: &Chunk, _vector: &[f32]) -> Result<(), EngramError> {
        let n = self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_insert == Some(n) {
            return Err(EngramError::upstream("weaviate", "simulated insert failure"));
        }
        self.objects.lock().unwrap().insert(chunk.id, chunk.clone());
        Ok(())
    }

    async fn hybrid(&self, query: &HybridQuery) -> Result<Vec<Candidate>, EngramError> {
        let objects = self.objects.lock().unwrap();
        let mut candidates: Vec<Candidate> = objects
            .values()
            .filter(|c| c.session_id == query.session_id)
            .take(query.limit)
            .map(|c| Candidate {
                id: c.id.to_string(),
                properties: ChunkProperties {
                    chunk_id: c.id.to_string(),
                    content: c.content.clone(),
                    emotions: c.emotions.clone(),
                    timestamp: c.timestamps.clone(),
                    temporal_context: c.temporal_context.clone(),
                    cognitive_weight: 1.0,
                },
                metadata: CandidateMetadata {
                    score: Some(0.7),
                    explain_score: None,
                },
            })
            .collect();
        candidates.sort_by(|a, b| a.properties.chunk_id.cmp(&b.properties.chunk_id));
        Ok(candidates)
    }
}

struct Pipeline {
    db: Database,
    ingestor: ChunkIngestor,
    retriever: MemoryRetriever,
    formatter: MemoryFormatter,
    index: Arc<MemoryIndex>,
    _dir: tempfile::TempDir,
}

async fn pipeline_with(index: MemoryIndex) -> Pipeline {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("pipeline.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    let index = Arc::new(index);

    let chunker = DialogChunker::new(ChunkerConfig::default(), Arc::new(FakeEmotion));
    let ingestor = ChunkIngestor::new(
        db.clone(),
        chunker,
        Arc::new(FakeEmbedding),
        Arc::clone(&index) as Arc<dyn VectorIndex>,
        Arc::new(SessionLocks::new(Duration::from_millis(500))),
    );
    let retriever = MemoryRetriever::new(
        RetrievalConfig::default(),
        Arc::new(FakeEmbedding),
        Arc::clone(&index) as Arc<dyn VectorIndex>,
        CognitiveReranker::new(CognitiveConfig::default(), Arc::new(FakeRerank)),
    );
    let formatter = MemoryFormatter::new(FormatterConfig::default());

    Pipeline {
        db,
        ingestor,
        retriever,
        formatter,
        index,
        _dir: dir,
    }
}

async fn pipeline() -> Pipeline {
    pipeline_with(MemoryIndex::default()).await
}

async fn seed_anxiety_dialog(db: &Database, sid: Uuid) {
    let turns = [
        (Role::User, "I feel anxious"),
        (Role::Assistant, "Tell me more"),
        (Role::User, "My chest feels tight"),
        (Role::Assistant, "Let's breathe together"),
        (Role::User, "Ok"),
        (Role::Assistant, "Good"),
    ];
    for (role, content) in turns {
        queries::messages::append_message(db, sid, "alice", role, content)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn six_turn_dialog_produces_two_linked_chunks() {
    let p = pipeline().await;
    let sid = Uuid::new_v4();
    seed_anxiety_dialog(&p.db, sid).await;

    let result = p.ingestor.ingest(sid).await.unwrap();
    assert_eq!(result.chunks_created, 2);
    assert_eq!(result.chunks_upserted, 2);

    let objects = p.index.objects.lock().unwrap();
    assert_eq!(objects.len(), 2);
    let second = objects
        .values()
        .find(|c| c.temporal_context.prev_chunk_id.is_some())
        .expect("one chunk continues the other");
    let first_id = second.temporal_context.prev_chunk_id.clone().unwrap();
    assert!(objects.values().any(|c| c.id.to_string() == first_id));
}

#[tokio::test]
async fn second_ingestion_run_writes_nothing() {
    let p = pipeline().await;
    let sid = Uuid::new_v4();
    seed_anxiety_dialog(&p.db, sid).await;

    p.ingestor.ingest(sid).await.unwrap();
    let writes = p.index.inserts.load(Ordering::SeqCst);

    let second = p.ingestor.ingest(sid).await.unwrap();
    assert_eq!(second, IngestResult::default());
    assert_eq!(p.index.inserts.load(Ordering::SeqCst), writes);
}

#[tokio::test]
async fn retrieve_without_session_fails_before_any_store_call() {
    let p = pipeline().await;
    let err = p
        .retriever
        .retrieve("anxious", &RetrievalContext::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngramError::InsufficientContext { field: "session_id" }
    ));
}

#[tokio::test]
async fn empty_store_yields_explicit_not_found() {
    let p = pipeline().await;
    let ctx = RetrievalContext {
        session_id: Some(Uuid::new_v4()),
        ..RetrievalContext::default()
    };
    let result = p.retriever.retrieve("anything", &ctx).await.unwrap();
    assert_eq!(result.outcome, RetrievalOutcome::NotFound);
    assert!(result.top_chunks.is_empty());
    assert!(result.emotion_groups.is_empty());
    assert_eq!(result.description, "Memory not found");
}

#[tokio::test]
async fn one_failed_upsert_fails_the_batch_and_keeps_the_watermark() {
    // 12 messages -> 3 chunks; fail the second insert.
    let p = pipeline_with(MemoryIndex {
        fail_on_insert: Some(1),
        ..MemoryIndex::default()
    })
    .await;
    let sid = Uuid::new_v4();
    for i in 0..12 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        queries::messages::append_message(&p.db, sid, "alice", role, &format!("turn {i}"))
            .await
            .unwrap();
    }

    let err = p.ingestor.ingest(sid).await.unwrap_err();
    assert!(matches!(
        err,
        EngramError::PartialFailure { failed: 1, total: 3 }
    ));

    let watermark = IngestionWatermark::new(p.db.clone());
    let state = watermark.read(sid).await.unwrap();
    assert_eq!(state.head, 0);
    assert!(state.has_pending());

    // The retried range re-upserts only what is missing.
    let result = p.ingestor.ingest(sid).await.unwrap();
    assert_eq!(result.chunks_created, 3);
    assert_eq!(result.chunks_upserted, 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(watermark.read(sid).await.unwrap().head, 12);
}

#[tokio::test]
async fn ingested_memories_round_trip_through_retrieval_and_formatting() {
    let p = pipeline().await;
    let sid = Uuid::new_v4();
    seed_anxiety_dialog(&p.db, sid).await;
    p.ingestor.ingest(sid).await.unwrap();

    let ctx = RetrievalContext {
        session_id: Some(sid),
        emotion: Some("fear".to_string()),
        ..RetrievalContext::default()
    };
    let result = p.retriever.retrieve("chest", &ctx).await.unwrap();
    assert_eq!(result.outcome, RetrievalOutcome::Found);
    assert_eq!(result.description, "Memory found");
    assert_eq!(result.ranked.len(), 2);
    // The chunk containing the query term ranks first.
    assert!(result.ranked[0].properties.content.contains("chest"));
    assert!(result.emotion_groups.contains_key("fear"));
    let metrics = result.metrics.unwrap();
    assert_eq!(metrics.initial_candidates, 2);

    let formatted = p.formatter.format(&result.ranked, 3);
    assert_eq!(formatted.len(), 2);
    assert!(formatted[0].content.contains("My chest feels tight"));
    assert_eq!(formatted[0].time_label, "just now");
    assert_eq!(formatted[0].emotion, "Fear");

    let blocks = MemoryFormatter::render_blocks(&formatted);
    assert!(blocks.starts_with("Memory 1:"));
    assert!(blocks.contains("Memory 2:"));
}

#[tokio::test]
async fn other_sessions_memories_are_invisible() {
    let p = pipeline().await;
    let ours = Uuid::new_v4();
    let theirs = Uuid::new_v4();
    seed_anxiety_dialog(&p.db, ours).await;
    seed_anxiety_dialog(&p.db, theirs).await;
    p.ingestor.ingest(ours).await.unwrap();
    p.ingestor.ingest(theirs).await.unwrap();

    let ctx = RetrievalContext {
        session_id: Some(ours),
        ..RetrievalContext::default()
    };
    let result = p.retriever.retrieve("anxious", &ctx).await.unwrap();
    assert_eq!(result.ranked.len(), 2, "only our session's chunks");
}
