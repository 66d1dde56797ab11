// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding-window dialog chunker.
//!
//! Converts an ordered message range into overlapping chunk windows with
//! deterministic ids, so re-chunking an unchanged range is idempotent.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use engram_config::model::ChunkerConfig;
use engram_core::{Chunk, EmotionService, Message, Role, TemporalContext};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::splitter;

/// Windows long dialog history into retrievable chunks.
pub struct DialogChunker {
    config: ChunkerConfig,
    emotion: Arc<dyn EmotionService>,
}

impl DialogChunker {
    pub fn new(config: ChunkerConfig, emotion: Arc<dyn EmotionService>) -> Self {
        Self { config, emotion }
    }

    /// Chunk an ordered message range.
    ///
    /// Chunk identity is anchored to message positions, so the same
    /// window always yields the same id and windows over different
    /// messages never share one, however earlier batches were split.
    ///
    /// Emotion-labeler failures degrade each affected window to an empty
    /// emotion list; they never abort chunking.
    pub async fn chunk(&self, messages: &[Message]) -> Vec<Chunk> {
        if messages.is_empty() {
            return Vec::new();
        }
        let session_id = messages[0].session_id;
        info!(session_id = %session_id, messages = messages.len(), "starting chunking");

        let pieces = self.pre_split(messages);

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut buffer: Vec<&(Message, u32)> = Vec::new();

        for (i, piece) in pieces.iter().enumerate() {
            buffer.push(piece);

            if buffer.len() >= self.config.window_size || i == pieces.len() - 1 {
                let chunk = self
                    .close_window(session_id, &buffer, chunks.last().map(|c| c.id))
                    .await;
                chunks.push(chunk);

                // Slide the window, keeping the configured overlap.
                if self.config.overlap > 0 && buffer.len() > self.config.overlap {
                    buffer.drain(..buffer.len() - self.config.overlap);
                } else if self.config.overlap == 0 {
                    buffer.clear();
                }
            }
        }

        info!(session_id = %session_id, chunks = chunks.len(), "chunking complete");
        chunks
    }

    /// Pre-split long assistant messages; each piece inherits the
    /// parent's author, role, position, and timestamp, and carries its
    /// ordinal within the parent so split pieces stay distinguishable.
    fn pre_split(&self, messages: &[Message]) -> Vec<(Message, u32)> {
        let mut processed = Vec::with_capacity(messages.len());
        for msg in messages {
            if msg.role == Role::Assistant
                && msg.content.chars().count() > self.config.split_threshold
            {
                debug!(position = msg.position, "long assistant message, splitting");
                let pieces = splitter::split_text(
                    &msg.content,
                    self.config.split_size,
                    self.config.split_overlap,
                );
                if pieces.is_empty() {
                    // One bad message must not abort the session's run.
                    warn!(position = msg.position, "splitting produced nothing, dropping message");
                    continue;
                }
                for (ordinal, piece) in pieces.into_iter().enumerate() {
                    let mut part = msg.clone();
                    part.content = piece;
                    processed.push((part, ordinal as u32));
                }
            } else {
                processed.push((msg.clone(), 0));
            }
        }
        processed
    }

    async fn close_window(
        &self,
        session_id: Uuid,
        buffer: &[&(Message, u32)],
        prev_chunk_id: Option<Uuid>,
    ) -> Chunk {
        let content = buffer
            .iter()
            .map(|(m, _)| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let user_text = buffer
            .iter()
            .filter(|(m, _)| m.role == Role::User)
            .map(|(m, _)| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let emotions = if user_text.trim().is_empty() {
            Vec::new()
        } else {
            match self.emotion.label(&user_text).await {
                Ok(labels) => labels,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "emotion labeling failed, degrading to empty");
                    Vec::new()
                }
            }
        };

        let time_span_seconds = buffer
            .windows(2)
            .map(|pair| {
                let prev = pair[0].0.created_at;
                let curr = pair[1].0.created_at;
                (curr - prev).num_milliseconds() as f64 / 1000.0
            })
            .collect();

        let timestamps: Vec<DateTime<Utc>> = buffer.iter().map(|(m, _)| m.created_at).collect();

        let usernames: Vec<String> = buffer
            .iter()
            .map(|(m, _)| m.author.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let speakers: Vec<String> = buffer
            .iter()
            .map(|(m, _)| m.role.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let start = (buffer[0].0.position, buffer[0].1);
        let last = buffer[buffer.len() - 1];
        let end = (last.0.position, last.1);

        Chunk {
            id: chunk_id(session_id, start, end),
            content,
            session_id,
            usernames,
            speakers,
            emotions,
            timestamps,
            temporal_context: TemporalContext {
                start_index: start.0,
                end_index: end.0,
                session_positions: buffer.iter().map(|(m, _)| m.position).collect(),
                message_indices: (0..buffer.len() as i64).collect(),
                prev_chunk_id: prev_chunk_id.map(|id| id.to_string()),
                time_span_seconds,
            },
        }
    }
}

/// Deterministic chunk id over the session and the window's message range.
///
/// `start` and `end` are `(message position, split piece)` pairs. Pieces
/// split from one long message share the parent's position; the piece
/// ordinal keeps windows over them distinct from every later range.
pub fn chunk_id(session_id: Uuid, start: (i64, u32), end: (i64, u32)) -> Uuid {
    let name = format!("{session_id}_{}.{}-{}.{}", start.0, start.1, end.0, end.1);
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes())
}
