// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion pipeline: unprocessed messages -> chunks -> vector store.
//!
//! At-least-once delivery into the vector store, exactly-once watermark
//! advancement. The deterministic chunk ids plus the existence check make
//! retries idempotent.

use std::sync::Arc;

use engram_core::{Chunk, EmbeddingService, EngramError, IngestResult, VectorIndex};
use engram_storage::{queries, Database, IngestionWatermark, SessionLocks};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunker::DialogChunker;

/// Concurrent chunk upserts per ingestion batch.
const UPSERT_CONCURRENCY: usize = 4;

/// Ingests a session's unprocessed message tail into the vector store.
pub struct ChunkIngestor {
    db: Database,
    chunker: DialogChunker,
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    watermark: IngestionWatermark,
    locks: Arc<SessionLocks>,
}

impl ChunkIngestor {
    pub fn new(
        db: Database,
        chunker: DialogChunker,
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        let watermark = IngestionWatermark::new(db.clone());
        Self {
            db,
            chunker,
            embedding,
            index,
            watermark,
            locks,
        }
    }

    /// Ingest everything past the session's watermark.
    ///
    /// The watermark advances only when every chunk in the batch was
    /// upserted (or already present); a partial failure leaves it
    /// untouched so the next run retries the same range.
    pub async fn ingest(&self, session_id: Uuid) -> Result<IngestResult, EngramError> {
        let state = self.watermark.read(session_id).await?;
        if !state.has_pending() {
            debug!(session_id = %session_id, head = state.head, "no new messages");
            return Ok(IngestResult::default());
        }
        // has_pending() guarantees a max position exists.
        let max = state.max_position.unwrap_or(state.head);

        let messages = queries::messages::get_messages_after(&self.db, session_id, state.head).await?;
        if messages.is_empty() {
            return Ok(IngestResult::default());
        }

        self.index.ensure_schema().await?;

        let chunks = self.chunker.chunk(&messages).await;
        let chunks_created = chunks.len();

        let results: Vec<Result<bool, EngramError>> = stream::iter(chunks)
            .map(|chunk| self.upsert_chunk(chunk))
            .buffer_unordered(UPSERT_CONCURRENCY)
            .collect()
            .await;

        let mut chunks_upserted = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for result in results {
            match result {
                Ok(true) => chunks_upserted += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "chunk upsert failed");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            // Watermark untouched: the next run retries the whole range.
            return Err(EngramError::PartialFailure {
                failed,
                total: chunks_created,
            });
        }

        // Read-modify-advance is the only critical section; the slow
        // embedding and upsert work above runs unlocked.
        let _guard = self.locks.acquire(session_id).await?;
        self.watermark.advance(session_id, max).await?;

        info!(
            session_id = %session_id,
            chunks_created,
            chunks_upserted,
            skipped,
            head = max,
            "ingestion complete"
        );
        Ok(IngestResult {
            chunks_created,
            chunks_upserted,
            skipped,
        })
    }

    /// Upsert one chunk. `Ok(true)` means newly written, `Ok(false)`
    /// means it was already present.
    async fn upsert_chunk(&self, chunk: Chunk) -> Result<bool, EngramError> {
        if self.index.exists(&chunk.id).await? {
            debug!(chunk_id = %chunk.id, "chunk already ingested, skipping");
            return Ok(false);
        }
        let vectors = self.embedding.embed(&[chunk.content.clone()]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EngramError::Internal("embedding returned no vector".to_string()))?;
        self.index.insert(&chunk, &vector).await?;
        Ok(true)
    }
}
