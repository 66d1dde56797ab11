// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion-classification adapter trait.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::traits::adapter::ServiceAdapter;

/// Adapter for classifying the emotional tone of text.
#[async_trait]
pub trait EmotionService: ServiceAdapter {
    /// Returns the top emotion labels for the text, ordered by
    /// descending confidence.
    async fn label(&self, text: &str) -> Result<Vec<String>, EngramError>;
}
