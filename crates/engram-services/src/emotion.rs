// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the emotion-classification microservice.

use std::time::Duration;

use async_trait::async_trait;
use engram_core::{EmotionService, EngramError, HealthStatus, ServiceAdapter};
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::http;

const SERVICE: &str = "emotion";

#[derive(Serialize)]
struct EmotionRequest {
    text: String,
}

#[derive(Deserialize)]
struct EmotionResponse {
    emotions: Vec<String>,
}

/// HTTP client for the `/emotion-score` classification service.
///
/// Repeated texts are served from a size-bounded LRU cache.
pub struct EmotionClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Vec<String>>,
}

impl EmotionClient {
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
impl ServiceAdapter for EmotionClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        http::probe_health(&self.client, &self.base_url, SERVICE).await
    }
}

#[async_trait]
impl EmotionService for EmotionClient {
    async fn label(&self, text: &str) -> Result<Vec<String>, EngramError> {
        if let Some(labels) = self.cache.get(text).await {
            return Ok(labels);
        }

        let response: EmotionResponse = http::post_json(
            &self.client,
            &format!("{}/emotion-score", self.base_url),
            SERVICE,
            &EmotionRequest {
                text: text.to_string(),
            },
        )
        .await?;

        self.cache
            .insert(text.to_string(), response.emotions.clone())
            .await;
        Ok(response.emotions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn label_returns_emotions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion-score"))
            .and(body_json(serde_json::json!({"text": "I got the job!"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "emotions": ["joy", "excitement"]
            })))
            .mount(&server)
            .await;

        let client = EmotionClient::new(&server.uri(), 16, Duration::from_secs(5)).unwrap();
        let labels = client.label("I got the job!").await.unwrap();
        assert_eq!(labels, vec!["joy", "excitement"]);
    }

    #[tokio::test]
    async fn repeated_text_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion-score"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "emotions": ["sadness"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmotionClient::new(&server.uri(), 16, Duration::from_secs(5)).unwrap();
        let first = client.label("my dog died").await.unwrap();
        let second = client.label("my dog died").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn service_failure_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion-score"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let client = EmotionClient::new(&server.uri(), 16, Duration::from_secs(5)).unwrap();
        let err = client.label("whatever").await.unwrap_err();
        assert!(matches!(err, EngramError::Upstream { .. }));
    }
}
