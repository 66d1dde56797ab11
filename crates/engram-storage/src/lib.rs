// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Engram memory core.
//!
//! Provides WAL-mode SQLite storage with an embedded schema, a
//! single-writer concurrency model via `tokio-rusqlite`, read-only message
//! range queries, the per-session ingestion watermark, and in-process
//! advisory session locks.

pub mod database;
pub mod locks;
pub mod queries;
pub mod watermark;

pub use database::Database;
pub use locks::SessionLocks;
pub use watermark::{IngestionWatermark, WatermarkState};
