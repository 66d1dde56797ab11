// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session advisory locks for ingestion.
//!
//! One ingestion run per session at a time, with a bounded wait. The
//! watermark's SQL-level `MAX()` clamp still guards correctness if a
//! second process writes to the same database; this lock only prevents
//! duplicate work inside one process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use engram_core::EngramError;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Map of per-session async mutexes, created on first use.
pub struct SessionLocks {
    inner: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    wait: Duration,
}

impl SessionLocks {
    /// Create a lock map with the given maximum acquisition wait.
    pub fn new(wait: Duration) -> Self {
        Self {
            inner: StdMutex::new(HashMap::new()),
            wait,
        }
    }

    /// Acquire the lock for a session, waiting at most the configured
    /// duration. Returns [`EngramError::Contention`] on timeout; the
    /// caller may retry later.
    pub async fn acquire(&self, session_id: Uuid) -> Result<OwnedMutexGuard<()>, EngramError> {
        let lock = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(map.entry(session_id).or_default())
        };

        tokio::time::timeout(self.wait, lock.lock_owned())
            .await
            .map_err(|_| EngramError::Contention {
                session_id: session_id.to_string(),
                waited: self.wait,
            })
    }
}
