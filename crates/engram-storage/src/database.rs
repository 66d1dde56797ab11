// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use engram_core::EngramError;
use tracing::debug;

/// Embedded schema, applied idempotently on open.
///
/// `messages` is append-only and keyed by `(session_id, position)`;
/// `ingestion_heads` tracks the highest ingested position per session.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id  TEXT NOT NULL,
    author      TEXT NOT NULL,
    role        TEXT NOT NULL,
    content     TEXT NOT NULL,
    position    INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (session_id, position)
);
CREATE INDEX IF NOT EXISTS idx_messages_session_position
    ON messages (session_id, position);

CREATE TABLE IF NOT EXISTS ingestion_heads (
    session_id        TEXT PRIMARY KEY,
    current_position  INTEGER NOT NULL DEFAULT 0,
    updated_at        TEXT NOT NULL
);
";

/// Handle to the SQLite database.
///
/// Cheap to clone; all clones share the single background connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, applying pragmas and the
    /// embedded schema.
    pub async fn open(path: &str) -> Result<Self, EngramError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| EngramError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| EngramError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA foreign_keys=ON;
                 PRAGMA busy_timeout=5000;",
            )?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), EngramError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> EngramError {
    EngramError::Storage {
        source: Box::new(e),
    }
}
