// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion watermark: tracks how far each session has been ingested.

use engram_core::EngramError;
use tracing::debug;
use uuid::Uuid;

use crate::database::Database;
use crate::queries;

/// Snapshot of a session's ingestion progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkState {
    /// Highest ingested position; 0 means nothing ingested yet.
    pub head: i64,
    /// Highest stored message position, `None` for an empty session.
    pub max_position: Option<i64>,
}

impl WatermarkState {
    /// Whether there are unprocessed messages past the head.
    pub fn has_pending(&self) -> bool {
        self.max_position.is_some_and(|max| max > self.head)
    }
}

/// Per-session ingestion watermark over the `ingestion_heads` table.
///
/// Advancement is monotonic: a target at or below the current head is a
/// logged no-op, enforced both here and by the upsert's `MAX()` clamp.
#[derive(Clone)]
pub struct IngestionWatermark {
    db: Database,
}

impl IngestionWatermark {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read the head and the highest stored position for a session.
    pub async fn read(&self, session_id: Uuid) -> Result<WatermarkState, EngramError> {
        let head = queries::watermark::read_head(&self.db, session_id).await?;
        let max_position = queries::messages::max_position(&self.db, session_id).await?;
        Ok(WatermarkState { head, max_position })
    }

    /// Advance the head to `to`, returning the effective head.
    pub async fn advance(&self, session_id: Uuid, to: i64) -> Result<i64, EngramError> {
        let effective = queries::watermark::advance_head(&self.db, session_id, to).await?;
        if effective > to {
            debug!(
                session_id = %session_id,
                requested = to,
                effective,
                "watermark advance clamped to current head"
            );
        }
        Ok(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::Role;
    use tempfile::tempdir;

    async fn setup() -> (Database, IngestionWatermark, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let watermark = IngestionWatermark::new(db.clone());
        (db, watermark, dir)
    }

    #[tokio::test]
    async fn empty_session_has_nothing_pending() {
        let (_db, watermark, _dir) = setup().await;
        let state = watermark.read(Uuid::new_v4()).await.unwrap();
        assert_eq!(state.head, 0);
        assert_eq!(state.max_position, None);
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn pending_reflects_unprocessed_tail() {
        let (db, watermark, _dir) = setup().await;
        let sid = Uuid::new_v4();

        for i in 0..3 {
            queries::messages::append_message(&db, sid, "alice", Role::User, &format!("m{i}"))
                .await
                .unwrap();
        }

        let state = watermark.read(sid).await.unwrap();
        assert_eq!(state.head, 0);
        assert_eq!(state.max_position, Some(3));
        assert!(state.has_pending());

        watermark.advance(sid, 3).await.unwrap();
        let state = watermark.read(sid).await.unwrap();
        assert_eq!(state.head, 3);
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn advance_is_monotonic() {
        let (_db, watermark, _dir) = setup().await;
        let sid = Uuid::new_v4();

        assert_eq!(watermark.advance(sid, 8).await.unwrap(), 8);
        assert_eq!(watermark.advance(sid, 2).await.unwrap(), 8);
    }
}
