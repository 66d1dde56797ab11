// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded agentic loop: model turns alternating with recall tool calls.
//!
//! State machine: `Start -> (ModelTurn <-> ToolCall) -> Done |
//! LimitExceeded | Error`. Tool failures and timeouts degrade to a "no
//! memories" tool result; only chat-model failures abort the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engram_config::model::AgentConfig;
use engram_core::{ChatMessage, ChatOptions, ChatProvider, EngramError, ToolCall};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::recall::{RecallPipeline, NO_MEMORIES};
use crate::tools::{recall_memories_tool, RECALL_MEMORIES};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to the user's past \
conversations. When the user refers to something discussed before, call the recall_memories tool \
to look it up before answering. Answer from recalled memories when they are relevant; otherwise \
answer normally. Never invent memories.";

/// Terminal state of one agent run.
#[derive(Debug)]
pub enum AgentOutcome {
    /// The model produced a plain answer.
    Answer {
        content: String,
        conversation: Vec<ChatMessage>,
    },
    /// The round limit was hit before the model answered. The partial
    /// transcript is attached for inspection.
    LimitExceeded { conversation: Vec<ChatMessage> },
}

/// Seam over the recall pipeline so the loop can be exercised without
/// live retrieval collaborators.
#[async_trait]
pub trait MemoryRecall: Send + Sync {
    async fn recall(&self, session_id: Uuid, query: &str) -> Result<String, EngramError>;
}

#[async_trait]
impl MemoryRecall for RecallPipeline {
    async fn recall(&self, session_id: Uuid, query: &str) -> Result<String, EngramError> {
        RecallPipeline::recall(self, session_id, query).await
    }
}

/// Drives the bounded model-turn / tool-call loop.
pub struct AgentOrchestrator {
    chat: Arc<dyn ChatProvider>,
    recall: Arc<dyn MemoryRecall>,
    config: AgentConfig,
}

impl AgentOrchestrator {
    pub fn new(chat: Arc<dyn ChatProvider>, recall: Arc<dyn MemoryRecall>, config: AgentConfig) -> Self {
        Self { chat, recall, config }
    }

    /// Run the loop for one user query.
    ///
    /// Chat-model failures (unreachable server, missing model) abort
    /// immediately; recall failures never do.
    pub async fn run(&self, session_id: Uuid, query: &str) -> Result<AgentOutcome, EngramError> {
        self.chat.verify_model().await?;

        let system_prompt = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let mut conversation = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];
        let tools = [recall_memories_tool()];
        let options = ChatOptions {
            temperature: self.config.temperature,
            num_ctx: self.config.num_ctx,
        };

        for round in 1..=self.config.round_limit {
            debug!(round, limit = self.config.round_limit, "model turn");
            let response = self.chat.chat(&conversation, &tools, &options).await?;

            if response.message.tool_calls.is_empty() {
                let content = response.message.content;
                conversation.push(ChatMessage::assistant(content.clone()));
                info!(round, "agent answered");
                return Ok(AgentOutcome::Answer { content, conversation });
            }

            // The assistant turn that requested the tools comes first, so
            // each tool result immediately follows its trigger.
            conversation.push(ChatMessage::assistant(response.message.content.clone()));
            for call in &response.message.tool_calls {
                let content = self.execute_tool(session_id, call).await;
                conversation.push(ChatMessage {
                    role: "tool".to_string(),
                    content,
                    tool_call_id: call.id.clone(),
                    name: Some(call.function.name.clone()),
                });
            }
        }

        warn!(limit = self.config.round_limit, "round limit exceeded without an answer");
        Ok(AgentOutcome::LimitExceeded { conversation })
    }

    /// Execute one tool call under the configured deadline. All failures
    /// degrade to a harmless tool-result string.
    async fn execute_tool(&self, session_id: Uuid, call: &ToolCall) -> String {
        if call.function.name != RECALL_MEMORIES {
            warn!(tool = %call.function.name, "model requested an unknown tool");
            return format!("Unknown tool: {}", call.function.name);
        }
        let Some(query) = call.function.arguments["query"].as_str() else {
            warn!("recall_memories called without a query argument");
            return NO_MEMORIES.to_string();
        };

        let deadline = Duration::from_secs(self.config.tool_timeout_secs);
        match tokio::time::timeout(deadline, self.recall.recall(session_id, query)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "recall failed, continuing without memories");
                NO_MEMORIES.to_string()
            }
            Err(_) => {
                warn!(timeout = ?deadline, "recall timed out, continuing without memories");
                NO_MEMORIES.to_string()
            }
        }
    }
}
