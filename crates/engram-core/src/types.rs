// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Engram workspace.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health status reported by service health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is fully operational.
    Healthy,
    /// Service is operational but experiencing issues.
    Degraded(String),
    /// Service is not operational.
    Unhealthy(String),
}

/// Speaker role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Convert to string for storage and prompt rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse from a storage string, defaulting unknown values to `User`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }

    /// Capitalized label used when rendering chunk content lines.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single conversation message, as read from the relational store.
///
/// Messages are immutable once created; this core only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Session this message belongs to.
    pub session_id: Uuid,
    /// Display name of the author.
    pub author: String,
    /// Speaker role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Monotonic position within the session.
    pub position: i64,
    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,
}

/// Conversation-flow metadata attached to a chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalContext {
    /// Position of the first message in the window.
    #[serde(default)]
    pub start_index: i64,
    /// Position of the last message in the window.
    #[serde(default)]
    pub end_index: i64,
    /// Session positions of the windowed messages. Serialized under the
    /// stored property name `session_position`.
    #[serde(default, rename = "session_position")]
    pub session_positions: Vec<i64>,
    /// Ordinals of the windowed pieces within the chunk.
    #[serde(default)]
    pub message_indices: Vec<i64>,
    /// Id of the chunk emitted immediately before this one, if any.
    #[serde(default)]
    pub prev_chunk_id: Option<String>,
    /// Seconds between consecutive messages in the window.
    #[serde(default)]
    pub time_span_seconds: Vec<f64>,
}

/// An overlapping window of consecutive conversation turns, treated as
/// one retrievable memory unit.
///
/// Identity is content-addressed: the id is a deterministic UUIDv5 over
/// the session id and the window's global index range, so re-chunking an
/// unchanged range always yields the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic chunk id.
    pub id: Uuid,
    /// Joined turn text, one `"<Role>: <text>"` line per message.
    pub content: String,
    /// Session the chunk belongs to.
    pub session_id: Uuid,
    /// Distinct author names in the window, sorted.
    pub usernames: Vec<String>,
    /// Distinct speaker roles in the window, sorted.
    pub speakers: Vec<String>,
    /// Top-k emotion labels for the window's user text, descending
    /// confidence. Empty when labeling was skipped or failed.
    pub emotions: Vec<String>,
    /// Timestamps of the windowed messages.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Conversation-flow metadata.
    pub temporal_context: TemporalContext,
}

/// Chunk properties as stored in (and read back from) the vector store.
///
/// All fields default so that a malformed stored object degrades to
/// neutral scoring instead of aborting a rerank batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkProperties {
    #[serde(default)]
    pub chunk_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub timestamp: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub temporal_context: TemporalContext,
    /// Precomputed salience. Chunks above the configured threshold get a
    /// non-linear boost during reranking.
    #[serde(default = "default_cognitive_weight")]
    pub cognitive_weight: f64,
}

fn default_cognitive_weight() -> f64 {
    1.0
}

impl Default for ChunkProperties {
    fn default() -> Self {
        Self {
            chunk_id: String::new(),
            content: String::new(),
            emotions: Vec::new(),
            timestamp: Vec::new(),
            temporal_context: TemporalContext::default(),
            cognitive_weight: 1.0,
        }
    }
}

/// Store-level metadata attached to a hybrid-query candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateMetadata {
    /// Fused vector+keyword score reported by the store, if requested.
    #[serde(default)]
    pub score: Option<f64>,
    /// Store-side score explanation, if requested.
    #[serde(default)]
    pub explain_score: Option<String>,
}

/// A raw candidate returned by a hybrid query, before cognitive reranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Vector-store object id.
    pub id: String,
    /// Stored chunk properties.
    pub properties: ChunkProperties,
    /// Store-level metadata.
    pub metadata: CandidateMetadata,
}

/// A candidate with its composite cognitive relevance score. Transient.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    /// Composite cognitive score, higher is more relevant.
    pub score: f64,
    /// Chunk properties carried through from the candidate.
    pub properties: ChunkProperties,
    /// Store-level metadata carried through from the candidate.
    pub metadata: CandidateMetadata,
}

/// Caller-supplied context for a retrieval request.
#[derive(Debug, Clone, Default)]
pub struct RetrievalContext {
    /// Session to scope the query to. Required.
    pub session_id: Option<Uuid>,
    /// Current emotional state of the user, if known.
    pub emotion: Option<String>,
    /// Id of the chunk last surfaced to the user, for continuity boosts.
    pub last_chunk_id: Option<String>,
    /// Override for the configured candidate limit.
    pub top_k: Option<usize>,
}

/// Whether a retrieval produced any memories. Empty is a legitimate
/// terminal state, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Found,
    NotFound,
}

/// A top-ranked chunk projected for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct TopChunk {
    pub content: String,
    pub cognitive_score: f64,
    pub emotions: Vec<String>,
    /// Most recent message timestamp in the chunk, if any.
    pub latest_timestamp: Option<DateTime<Utc>>,
}

/// A chunk grouped under its primary emotion for alternative presentation.
#[derive(Debug, Clone, Serialize)]
pub struct EmotionGroupEntry {
    pub content: String,
    pub score: f64,
    pub latest_timestamp: Option<DateTime<Utc>>,
    /// Previous-chunk link, when the memory continues an earlier one.
    pub associative_link: Option<String>,
}

/// Aggregate statistics about one retrieval run.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalMetrics {
    /// Candidate count before reranking.
    pub initial_candidates: usize,
    /// Mean cognitive score over the top-k reranked candidates.
    pub mean_cognitive_score: f64,
    /// Configured retention window, in days.
    pub retention_days: u32,
}

/// Full result of a retrieval request.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub outcome: RetrievalOutcome,
    /// Bounded list of top-ranked chunks.
    pub top_chunks: Vec<TopChunk>,
    /// Top candidates grouped by their primary emotion label.
    pub emotion_groups: BTreeMap<String, Vec<EmotionGroupEntry>>,
    pub metrics: Option<RetrievalMetrics>,
    /// Human-readable outcome description.
    pub description: String,
    /// Full reranked list, for downstream formatting.
    pub ranked: Vec<RankedCandidate>,
}

impl RetrievalResult {
    /// An explicit empty result with the given description.
    pub fn not_found(description: &str) -> Self {
        Self {
            outcome: RetrievalOutcome::NotFound,
            top_chunks: Vec::new(),
            emotion_groups: BTreeMap::new(),
            metrics: None,
            description: description.to_string(),
            ranked: Vec::new(),
        }
    }
}

/// A ranked memory projected into a compact, LLM-readable form. Transient.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedMemory {
    /// Relative time label ("just now", "3 hour(s) ago", "yesterday", date).
    pub time_label: String,
    pub content: String,
    /// Joined emotion labels, capitalized.
    pub emotion: String,
    /// Importance label derived from the cognitive score.
    pub importance: String,
    /// Whether the chunk continues an earlier memory.
    pub continues_from: bool,
}

/// Result of one ingestion run for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestResult {
    /// Chunks produced by the chunker for the unprocessed range.
    pub chunks_created: usize,
    /// Chunks newly embedded and upserted into the vector store.
    pub chunks_upserted: usize,
    /// Chunks already present (idempotent skip).
    pub skipped: usize,
}

// --- Chat types ---

/// One turn in a model conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", "assistant", or "tool".
    pub role: String,
    pub content: String,
    /// Correlation id for tool-result turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name for tool-result turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_call_id: None,
            name: None,
        }
    }
}

/// A model-issued request to invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub function: ToolFunction,
}

/// The function portion of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    /// JSON arguments object.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// JSON-schema description of a tool exposed to the chat model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolSpecFunction,
}

/// The function portion of a tool schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpecFunction {
    pub name: String,
    pub description: String,
    /// JSON-schema parameters object.
    pub parameters: serde_json::Value,
}

/// Sampling options passed to the chat model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    pub temperature: f64,
    pub num_ctx: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_ctx: 2048,
        }
    }
}

/// The assistant turn returned by the chat model.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Response from one chat completion call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatResponseMessage,
}

// --- Hybrid query types ---

/// How vector and keyword scores are fused by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionKind {
    /// Normalize both score distributions and blend by alpha.
    RelativeScore,
    /// Rank-based fusion.
    Ranked,
}

/// One hybrid (vector + BM25) query against the vector store.
#[derive(Debug, Clone)]
pub struct HybridQuery {
    /// Raw query text for the keyword leg.
    pub query: String,
    /// Precomputed query embedding for the vector leg.
    pub vector: Vec<f32>,
    /// Weight toward vector similarity, in [0, 1].
    pub alpha: f64,
    pub fusion: FusionKind,
    pub limit: usize,
    /// Equality filter scoping results to one session.
    pub session_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Role::from_str_value("assistant"), Role::Assistant);
        assert_eq!(Role::from_str_value("user"), Role::User);
        assert_eq!(Role::from_str_value("garbage"), Role::User);
    }

    #[test]
    fn role_labels_capitalized() {
        assert_eq!(Role::User.label(), "User");
        assert_eq!(Role::Assistant.label(), "Assistant");
    }

    #[test]
    fn chunk_properties_defaults_are_neutral() {
        let props: ChunkProperties = serde_json::from_str("{}").unwrap();
        assert!(props.content.is_empty());
        assert!(props.emotions.is_empty());
        assert!(props.timestamp.is_empty());
        assert!(props.temporal_context.prev_chunk_id.is_none());
        assert!((props.cognitive_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chunk_properties_partial_deserialization() {
        // A stored object missing most fields still deserializes.
        let props: ChunkProperties =
            serde_json::from_str(r#"{"content": "User: hi"}"#).unwrap();
        assert_eq!(props.content, "User: hi");
        assert!((props.cognitive_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn not_found_result_is_empty() {
        let result = RetrievalResult::not_found("Memory not found");
        assert_eq!(result.outcome, RetrievalOutcome::NotFound);
        assert!(result.top_chunks.is_empty());
        assert!(result.emotion_groups.is_empty());
        assert!(result.ranked.is_empty());
        assert_eq!(result.description, "Memory not found");
    }

    #[test]
    fn chat_message_constructors() {
        let msg = ChatMessage::system("prompt");
        assert_eq!(msg.role, "system");
        assert!(msg.tool_call_id.is_none());

        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn tool_call_deserializes_without_id() {
        // Some chat APIs omit the tool-call id.
        let call: ToolCall = serde_json::from_str(
            r#"{"function": {"name": "recall_memories", "arguments": {"query": "dogs"}}}"#,
        )
        .unwrap();
        assert!(call.id.is_none());
        assert_eq!(call.function.name, "recall_memories");
        assert_eq!(call.function.arguments["query"], "dogs");
    }
}
