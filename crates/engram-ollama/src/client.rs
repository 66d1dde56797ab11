// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama chat API.

use std::time::Duration;

use async_trait::async_trait;
use engram_core::{
    ChatMessage, ChatOptions, ChatProvider, ChatResponse, EngramError, HealthStatus,
    ServiceAdapter, ToolSpec,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SERVICE: &str = "ollama";

/// Tool-capable, non-streaming chat client for an Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolSpec],
    options: OptionsBody,
}

#[derive(Serialize)]
struct OptionsBody {
    temperature: f64,
    num_ctx: u32,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, EngramError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngramError::Upstream {
                service: SERVICE,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Verify the configured model is present on the server.
    ///
    /// A reachable server without the model is an upstream error; the
    /// agent loop must not start against a model that cannot answer.
    pub async fn check_model(&self) -> Result<(), EngramError> {
        let tags = self.list_tags().await?;
        if tags.models.iter().any(|m| m.name == self.model) {
            debug!(model = %self.model, "model available");
            Ok(())
        } else {
            Err(EngramError::upstream(
                SERVICE,
                format!("model `{}` is not available on the server", self.model),
            ))
        }
    }

    async fn list_tags(&self) -> Result<TagsResponse, EngramError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngramError::Upstream {
                service: SERVICE,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngramError::upstream(
                SERVICE,
                format!("tags endpoint returned {status}: {body}"),
            ));
        }
        response.json().await.map_err(|e| EngramError::Upstream {
            service: SERVICE,
            message: format!("failed to parse tags response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl ServiceAdapter for OllamaClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(format!(
                "ollama returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("ollama unreachable: {e}"))),
        }
    }
}

#[async_trait]
impl ChatProvider for OllamaClient {
    async fn verify_model(&self) -> Result<(), EngramError> {
        self.check_model().await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<ChatResponse, EngramError> {
        const MAX_RETRIES: u32 = 1;
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            tools,
            options: OptionsBody {
                temperature: options.temperature,
                num_ctx: options.num_ctx,
            },
        };

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                warn!(service = SERVICE, attempt, "retrying chat after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| EngramError::Upstream {
                    service: SERVICE,
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(service = SERVICE, status = %status, attempt, "chat response received");

            if status.is_success() {
                return response.json().await.map_err(|e| EngramError::Upstream {
                    service: SERVICE,
                    message: format!("failed to parse chat response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < MAX_RETRIES {
                warn!(service = SERVICE, status = %status, body = %text, "transient error, will retry");
                last_error = Some(EngramError::upstream(
                    SERVICE,
                    format!("chat returned {status}: {text}"),
                ));
                continue;
            }
            return Err(EngramError::upstream(
                SERVICE,
                format!("chat returned {status}: {text}"),
            ));
        }

        Err(last_error
            .unwrap_or_else(|| EngramError::upstream(SERVICE, "chat failed after retries")))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
