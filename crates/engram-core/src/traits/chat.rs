// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completion adapter trait.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{ChatMessage, ChatOptions, ChatResponse, ToolSpec};

/// Adapter for tool-capable chat completion.
#[async_trait]
pub trait ChatProvider: ServiceAdapter {
    /// Confirms the configured model can serve completions. Providers
    /// without a model registry accept by default.
    async fn verify_model(&self) -> Result<(), EngramError> {
        Ok(())
    }

    /// Runs one non-streaming completion over the conversation so far.
    ///
    /// The returned message may carry tool calls instead of (or in
    /// addition to) content; the caller decides how to proceed.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<ChatResponse, EngramError>;
}
