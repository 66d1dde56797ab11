// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message read and append operations.
//!
//! The retrieval core treats message history as append-only: ingestion
//! only ever reads ranges, and `append_message` assigns the next position
//! atomically inside the single writer thread.

use chrono::{DateTime, Utc};
use engram_core::{EngramError, Message, Role};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{map_tr_err, Database};

/// Append a message to a session, assigning the next position.
///
/// Returns the assigned position (1-based).
pub async fn append_message(
    db: &Database,
    session_id: Uuid,
    author: &str,
    role: Role,
    content: &str,
) -> Result<i64, EngramError> {
    let author = author.to_string();
    let content = content.to_string();
    let created_at = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let position: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM messages WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO messages (session_id, author, role, content, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session_id.to_string(),
                    author,
                    role.as_str(),
                    content,
                    position,
                    created_at,
                ],
            )?;
            tx.commit()?;
            Ok(position)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a fully-specified message row. Test and backfill helper; the
/// `(session_id, position)` uniqueness constraint still applies.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), EngramError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (session_id, author, role, content, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.session_id.to_string(),
                    msg.author,
                    msg.role.as_str(),
                    msg.content,
                    msg.position,
                    msg.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get all messages for a session with `position > after`, in position
/// order. An empty result means the session is fully ingested (or empty).
pub async fn get_messages_after(
    db: &Database,
    session_id: Uuid,
    after: i64,
) -> Result<Vec<Message>, EngramError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, author, role, content, position, created_at
                 FROM messages
                 WHERE session_id = ?1 AND position > ?2
                 ORDER BY position ASC",
            )?;
            let rows = stmt.query_map(params![session_id.to_string(), after], |row| {
                let sid: String = row.get(0)?;
                let role: String = row.get(2)?;
                let created_at: String = row.get(5)?;
                Ok(Message {
                    session_id: parse_uuid(&sid, 0)?,
                    author: row.get(1)?,
                    role: Role::from_str_value(&role),
                    content: row.get(3)?,
                    position: row.get(4)?,
                    created_at: parse_timestamp(&created_at, 5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Highest message position for a session, or `None` for an empty session.
pub async fn max_position(db: &Database, session_id: Uuid) -> Result<Option<i64>, EngramError> {
    db.connection()
        .call(move |conn| {
            let max: Option<i64> = conn.query_row(
                "SELECT MAX(position) FROM messages WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(max)
        })
        .await
        .map_err(map_tr_err)
}

fn parse_uuid(s: &str, idx: usize) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(s: &str, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
