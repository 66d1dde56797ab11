// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the sentence-embedding microservice.

use std::time::Duration;

use async_trait::async_trait;
use engram_core::{EmbeddingService, EngramError, HealthStatus, ServiceAdapter};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

const SERVICE: &str = "embedding";

#[derive(Serialize)]
struct VectorizeRequest {
    texts: Vec<String>,
}

#[derive(Deserialize)]
struct VectorizeResponse {
    vectors: Vec<Vec<f32>>,
}

/// HTTP client for the `/vectorize` embedding service.
///
/// Identical texts hit a size-bounded LRU cache instead of the service;
/// only cache misses are sent, batched into one request.
pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Vec<f32>>,
}

impl EmbeddingClient {
    pub fn new(
        base_url: &str,
        cache_capacity: u64,
        timeout: Duration,
    ) -> Result<Self, EngramError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: http::normalize_base_url(base_url),
            cache: Cache::new(cache_capacity),
        })
    }
}

#[async_trait]
impl ServiceAdapter for EmbeddingClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        http::probe_health(&self.client, &self.base_url, SERVICE).await
    }
}

#[async_trait]
impl EmbeddingService for EmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngramError> {
        let mut out: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text).await {
                Some(vector) => out.push(Some(vector)),
                None => {
                    out.push(None);
                    misses.push((i, text.clone()));
                }
            }
        }

        if !misses.is_empty() {
            debug!(total = texts.len(), misses = misses.len(), "embedding cache misses");
            let request = VectorizeRequest {
                texts: misses.iter().map(|(_, t)| t.clone()).collect(),
            };
            let response: VectorizeResponse = http::post_json(
                &self.client,
                &format!("{}/vectorize", self.base_url),
                SERVICE,
                &request,
            )
            .await?;

            if response.vectors.len() != misses.len() {
                return Err(EngramError::upstream(
                    SERVICE,
                    format!(
                        "expected {} vectors, got {}",
                        misses.len(),
                        response.vectors.len()
                    ),
                ));
            }

            for ((i, text), vector) in misses.into_iter().zip(response.vectors) {
                self.cache.insert(text, vector.clone()).await;
                out[i] = Some(vector);
            }
        }

        out.into_iter()
            .map(|v| v.ok_or_else(|| EngramError::Internal("embedding batch left an unfilled slot".into())))
            .collect()
    }
}
