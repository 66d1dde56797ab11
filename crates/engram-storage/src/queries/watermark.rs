// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session ingestion head reads and monotonic advancement.

use chrono::Utc;
use engram_core::EngramError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{map_tr_err, Database};

/// Read the current ingestion head for a session. A session with no row
/// has ingested nothing, head 0.
pub async fn read_head(db: &Database, session_id: Uuid) -> Result<i64, EngramError> {
    db.connection()
        .call(move |conn| {
            let head: Option<i64> = conn
                .query_row(
                    "SELECT current_position FROM ingestion_heads WHERE session_id = ?1",
                    params![session_id.to_string()],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(head.unwrap_or(0))
        })
        .await
        .map_err(map_tr_err)
}

/// Advance the ingestion head to `to`, clamped monotonically.
///
/// The `MAX()` in the upsert guarantees the head never moves backwards
/// even under concurrent advancement. Returns the effective head after
/// the write.
pub async fn advance_head(db: &Database, session_id: Uuid, to: i64) -> Result<i64, EngramError> {
    let updated_at = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO ingestion_heads (session_id, current_position, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(session_id) DO UPDATE SET
                     current_position = MAX(current_position, excluded.current_position),
                     updated_at = excluded.updated_at",
                params![session_id.to_string(), to, updated_at],
            )?;
            let effective: i64 = tx.query_row(
                "SELECT current_position FROM ingestion_heads WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(effective)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn unknown_session_reads_zero() {
        let (db, _dir) = setup_db().await;
        assert_eq!(read_head(&db, Uuid::new_v4()).await.unwrap(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn advance_and_read_round_trip() {
        let (db, _dir) = setup_db().await;
        let sid = Uuid::new_v4();

        let effective = advance_head(&db, sid, 5).await.unwrap();
        assert_eq!(effective, 5);
        assert_eq!(read_head(&db, sid).await.unwrap(), 5);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn advance_never_moves_backwards() {
        let (db, _dir) = setup_db().await;
        let sid = Uuid::new_v4();

        advance_head(&db, sid, 10).await.unwrap();
        let effective = advance_head(&db, sid, 3).await.unwrap();
        assert_eq!(effective, 10, "lower target must clamp to current head");
        assert_eq!(read_head(&db, sid).await.unwrap(), 10);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn heads_are_independent_per_session() {
        let (db, _dir) = setup_db().await;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        advance_head(&db, a, 7).await.unwrap();
        assert_eq!(read_head(&db, a).await.unwrap(), 7);
        assert_eq!(read_head(&db, b).await.unwrap(), 0);

        db.close().await.unwrap();
    }
}
