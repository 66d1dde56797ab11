// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as weight positivity, fusion alpha range, and the
//! ordering of formatter thresholds.

use crate::diagnostic::ConfigError;
use crate::model::EngramConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &EngramConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.chunker.window_size == 0 {
        errors.push(validation("chunker.window_size must be at least 1"));
    }

    if config.chunker.overlap >= config.chunker.window_size && config.chunker.window_size > 0 {
        errors.push(validation(&format!(
            "chunker.overlap ({}) must be smaller than chunker.window_size ({})",
            config.chunker.overlap, config.chunker.window_size
        )));
    }

    if config.chunker.split_size == 0 {
        errors.push(validation("chunker.split_size must be at least 1"));
    }

    if config.chunker.split_overlap >= config.chunker.split_size && config.chunker.split_size > 0 {
        errors.push(validation(&format!(
            "chunker.split_overlap ({}) must be smaller than chunker.split_size ({})",
            config.chunker.split_overlap, config.chunker.split_size
        )));
    }

    for (name, value) in [
        ("cognitive.semantic_weight", config.cognitive.semantic_weight),
        ("cognitive.emotional_weight", config.cognitive.emotional_weight),
        ("cognitive.temporal_weight", config.cognitive.temporal_weight),
        (
            "cognitive.associative_weight",
            config.cognitive.associative_weight,
        ),
        ("cognitive.mismatch_score", config.cognitive.mismatch_score),
        ("cognitive.continuity_score", config.cognitive.continuity_score),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(validation(&format!("{name} must be positive, got {value}")));
        }
    }

    if !config.cognitive.weight_threshold.is_finite() || config.cognitive.weight_threshold < 0.0 {
        errors.push(validation(&format!(
            "cognitive.weight_threshold must be non-negative, got {}",
            config.cognitive.weight_threshold
        )));
    }

    if !(0.0..=1.0).contains(&config.retrieval.alpha) {
        errors.push(validation(&format!(
            "retrieval.alpha must be within [0, 1], got {}",
            config.retrieval.alpha
        )));
    }

    if config.retrieval.top_k == 0 {
        errors.push(validation("retrieval.top_k must be at least 1"));
    }

    let f = &config.formatter;
    if !(f.highly_relevant > f.relevant && f.relevant > f.mildly_relevant) {
        errors.push(validation(&format!(
            "formatter thresholds must be strictly decreasing: \
             highly_relevant ({}) > relevant ({}) > mildly_relevant ({})",
            f.highly_relevant, f.relevant, f.mildly_relevant
        )));
    }

    for (name, url) in [
        ("services.embedding_url", &config.services.embedding_url),
        ("services.emotion_url", &config.services.emotion_url),
        ("services.rerank_url", &config.services.rerank_url),
        ("weaviate.url", &config.weaviate.url),
        ("agent.chat_url", &config.agent.chat_url),
    ] {
        if url.trim().is_empty() {
            errors.push(validation(&format!("{name} must not be empty")));
        }
    }

    if config.weaviate.collection.trim().is_empty() {
        errors.push(validation("weaviate.collection must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(validation("storage.database_path must not be empty"));
    }

    if config.agent.round_limit == 0 {
        errors.push(validation("agent.round_limit must be at least 1"));
    }

    if config.agent.model.trim().is_empty() {
        errors.push(validation("agent.model must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validation(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_string(),
    }
}
