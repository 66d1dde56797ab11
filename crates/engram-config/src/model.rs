// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Engram memory core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Engram configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngramConfig {
    /// Dialog chunking settings.
    #[serde(default)]
    pub chunker: ChunkerConfig,

    /// Cognitive reranking weights and constants.
    #[serde(default)]
    pub cognitive: CognitiveConfig,

    /// Hybrid retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Memory formatting thresholds.
    #[serde(default)]
    pub formatter: FormatterConfig,

    /// Model microservice endpoints and caching.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Vector store settings.
    #[serde(default)]
    pub weaviate: WeaviateConfig,

    /// Relational storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Agent loop and chat model settings.
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Dialog chunking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkerConfig {
    /// Number of messages per chunk window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Number of trailing messages carried into the next window.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Assistant messages longer than this are pre-split.
    #[serde(default = "default_split_threshold")]
    pub split_threshold: usize,

    /// Target size of each pre-split piece, in characters.
    #[serde(default = "default_split_size")]
    pub split_size: usize,

    /// Character overlap between consecutive pre-split pieces.
    #[serde(default = "default_split_overlap")]
    pub split_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            overlap: default_overlap(),
            split_threshold: default_split_threshold(),
            split_size: default_split_size(),
            split_overlap: default_split_overlap(),
        }
    }
}

fn default_window_size() -> usize {
    5
}

fn default_overlap() -> usize {
    1
}

fn default_split_threshold() -> usize {
    500
}

fn default_split_size() -> usize {
    500
}

fn default_split_overlap() -> usize {
    50
}

/// Cognitive reranking weights and constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CognitiveConfig {
    /// Weight of the cross-encoder semantic score.
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,

    /// Weight of the emotional congruence score.
    #[serde(default = "default_emotional_weight")]
    pub emotional_weight: f64,

    /// Weight of the exponential recency score.
    #[serde(default = "default_temporal_weight")]
    pub temporal_weight: f64,

    /// Weight of the conversational continuity score.
    #[serde(default = "default_associative_weight")]
    pub associative_weight: f64,

    /// Emotional score applied when the query emotion is absent from a
    /// chunk's labels. Neutral 1.0 applies on match or when unset.
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: f64,

    /// Associative score applied when a chunk continues the last-surfaced
    /// chunk.
    #[serde(default = "default_continuity_score")]
    pub continuity_score: f64,

    /// Chunks whose stored cognitive weight exceeds this threshold get a
    /// non-linear boost, capped at 1.2x.
    #[serde(default = "default_weight_threshold")]
    pub weight_threshold: f64,
}

impl Default for CognitiveConfig {
    fn default() -> Self {
        Self {
            semantic_weight: default_semantic_weight(),
            emotional_weight: default_emotional_weight(),
            temporal_weight: default_temporal_weight(),
            associative_weight: default_associative_weight(),
            mismatch_score: default_mismatch_score(),
            continuity_score: default_continuity_score(),
            weight_threshold: default_weight_threshold(),
        }
    }
}

fn default_semantic_weight() -> f64 {
    0.4
}

fn default_emotional_weight() -> f64 {
    0.2
}

fn default_temporal_weight() -> f64 {
    0.25
}

fn default_associative_weight() -> f64 {
    0.15
}

fn default_mismatch_score() -> f64 {
    0.9
}

fn default_continuity_score() -> f64 {
    1.1
}

fn default_weight_threshold() -> f64 {
    0.8
}

/// Hybrid retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum candidates fetched from the vector store.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Hybrid fusion weight toward vector similarity, in [0, 1].
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Retention window reported in retrieval metrics, in days.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Number of top-ranked chunks projected into the result.
    #[serde(default = "default_top_chunks")]
    pub top_chunks: usize,

    /// Number of top-ranked chunks considered for emotion grouping.
    #[serde(default = "default_group_window")]
    pub group_window: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            alpha: default_alpha(),
            retention_days: default_retention_days(),
            top_chunks: default_top_chunks(),
            group_window: default_group_window(),
        }
    }
}

fn default_top_k() -> usize {
    10
}

fn default_alpha() -> f64 {
    0.65
}

fn default_retention_days() -> u32 {
    10
}

fn default_top_chunks() -> usize {
    5
}

fn default_group_window() -> usize {
    10
}

/// Memory formatting thresholds. Must be strictly decreasing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    /// Scores at or above this are labeled "Highly relevant".
    #[serde(default = "default_highly_relevant")]
    pub highly_relevant: f64,

    /// Scores at or above this are labeled "Relevant".
    #[serde(default = "default_relevant")]
    pub relevant: f64,

    /// Scores at or above this are labeled "Mildly relevant"; anything
    /// lower is "Low relevance".
    #[serde(default = "default_mildly_relevant")]
    pub mildly_relevant: f64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            highly_relevant: default_highly_relevant(),
            relevant: default_relevant(),
            mildly_relevant: default_mildly_relevant(),
        }
    }
}

fn default_highly_relevant() -> f64 {
    0.85
}

fn default_relevant() -> f64 {
    0.6
}

fn default_mildly_relevant() -> f64 {
    0.4
}

/// Model microservice endpoints and caching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesConfig {
    /// Base URL of the sentence-embedding service.
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,

    /// Base URL of the emotion-classification service.
    #[serde(default = "default_emotion_url")]
    pub emotion_url: String,

    /// Base URL of the cross-encoder rerank service.
    #[serde(default = "default_rerank_url")]
    pub rerank_url: String,

    /// Maximum entries held by the embedding and emotion caches.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Per-request timeout for model service calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            embedding_url: default_embedding_url(),
            emotion_url: default_emotion_url(),
            rerank_url: default_rerank_url(),
            cache_capacity: default_cache_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_embedding_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_emotion_url() -> String {
    "http://127.0.0.1:8082".to_string()
}

fn default_rerank_url() -> String {
    "http://127.0.0.1:8083".to_string()
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeaviateConfig {
    /// Base URL of the Weaviate instance.
    #[serde(default = "default_weaviate_url")]
    pub url: String,

    /// Collection (class) name holding dialog chunks.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: default_weaviate_url(),
            collection: default_collection(),
        }
    }
}

fn default_weaviate_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_collection() -> String {
    "DialogMemory".to_string()
}

/// Relational storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Maximum time to wait for a per-session ingestion lock, in
    /// milliseconds.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("engram").join("engram.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("engram.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_lock_wait_ms() -> u64 {
    5000
}

/// Agent loop and chat model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Base URL of the Ollama chat server.
    #[serde(default = "default_chat_url")]
    pub chat_url: String,

    /// Chat model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum model turns per query before the loop gives up.
    #[serde(default = "default_round_limit")]
    pub round_limit: usize,

    /// Deadline for one recall tool execution, in seconds.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Sampling temperature for the chat model.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Context window size requested from the chat model.
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Maximum formatted memories injected per tool result.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt override. Defaults to the built-in
    /// memory-recall prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chat_url: default_chat_url(),
            model: default_model(),
            round_limit: default_round_limit(),
            tool_timeout_secs: default_tool_timeout_secs(),
            temperature: default_temperature(),
            num_ctx: default_num_ctx(),
            memory_limit: default_memory_limit(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_chat_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_round_limit() -> usize {
    3
}

fn default_tool_timeout_secs() -> u64 {
    10
}

fn default_temperature() -> f64 {
    0.7
}

fn default_num_ctx() -> u32 {
    2048
}

fn default_memory_limit() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}
