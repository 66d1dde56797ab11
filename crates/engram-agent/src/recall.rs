// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall pipeline: retrieval, reranking, and formatting behind one call.

use engram_core::{EngramError, RetrievalContext, RetrievalOutcome};
use engram_memory::{MemoryFormatter, MemoryRetriever};
use tracing::debug;
use uuid::Uuid;

/// Tool result returned when retrieval finds nothing usable.
pub const NO_MEMORIES: &str = "No memories for the given query";

/// Runs one memory recall and renders the result as tool-output text.
pub struct RecallPipeline {
    retriever: MemoryRetriever,
    formatter: MemoryFormatter,
    memory_limit: usize,
}

impl RecallPipeline {
    pub fn new(retriever: MemoryRetriever, formatter: MemoryFormatter, memory_limit: usize) -> Self {
        Self {
            retriever,
            formatter,
            memory_limit,
        }
    }

    /// Retrieve, rerank, and format memories for a query. Empty results
    /// render as an explicit "no memories" message, never an error.
    pub async fn recall(&self, session_id: Uuid, query: &str) -> Result<String, EngramError> {
        let context = RetrievalContext {
            session_id: Some(session_id),
            ..RetrievalContext::default()
        };
        let result = self.retriever.retrieve(query, &context).await?;
        if result.outcome == RetrievalOutcome::NotFound {
            debug!(session_id = %session_id, "recall found nothing");
            return Ok(NO_MEMORIES.to_string());
        }

        let formatted = self.formatter.format(&result.ranked, self.memory_limit);
        if formatted.is_empty() {
            return Ok(NO_MEMORIES.to_string());
        }
        Ok(format!(
            "Recalled past conversations:\n\n{}",
            MemoryFormatter::render_blocks(&formatted)
        ))
    }
}
