// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the cross-encoder rerank microservice.
//!
//! No caching here: pairs include the live query text, so hit rates would
//! be negligible.

use std::time::Duration;

use async_trait::async_trait;
use engram_core::{EngramError, HealthStatus, RerankService, ServiceAdapter};
use serde::{Deserialize, Serialize};

use crate::http;

const SERVICE: &str = "rerank";

#[derive(Serialize)]
struct RerankRequest {
    pairs: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct RerankResponse {
    scores: Vec<f64>,
}

/// HTTP client for the `/rerank` cross-encoder service.
pub struct RerankClient {
    client: reqwest::Client,
    base_url: String,
}

impl RerankClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngramError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: http::normalize_base_url(base_url),
        })
    }
}

#[async_trait]
impl ServiceAdapter for RerankClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        http::probe_health(&self.client, &self.base_url, SERVICE).await
    }
}

#[async_trait]
impl RerankService for RerankClient {
    async fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f64>, EngramError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let response: RerankResponse = http::post_json(
            &self.client,
            &format!("{}/rerank", self.base_url),
            SERVICE,
            &RerankRequest {
                pairs: pairs.to_vec(),
            },
        )
        .await?;

        if response.scores.len() != pairs.len() {
            return Err(EngramError::upstream(
                SERVICE,
                format!(
                    "expected {} scores, got {}",
                    pairs.len(),
                    response.scores.len()
                ),
            ));
        }
        Ok(response.scores)
    }
}
