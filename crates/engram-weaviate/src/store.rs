// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Weaviate REST and GraphQL APIs.

use std::time::Duration;

use async_trait::async_trait;
use engram_core::{
    Candidate, CandidateMetadata, Chunk, ChunkProperties, EngramError, FusionKind, HealthStatus,
    HybridQuery, ServiceAdapter, VectorIndex,
};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::schema;

const SERVICE: &str = "weaviate";

/// Client for the dialog-memory collection in Weaviate.
///
/// Implements [`VectorIndex`]: schema bootstrap, idempotent object
/// existence checks, vector inserts, and hybrid (vector + BM25) queries.
pub struct WeaviateStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl WeaviateStore {
    pub fn new(base_url: &str, collection: &str, timeout: Duration) -> Result<Self, EngramError> {
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
            collection: collection.to_string(),
        })
    }

    fn send_err(e: reqwest::Error) -> EngramError {
        EngramError::Upstream {
            service: SERVICE,
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }

    /// Build the GraphQL hybrid query document.
    fn hybrid_graphql(&self, query: &HybridQuery) -> Result<String, EngramError> {
        let query_text = serde_json::to_string(&query.query)
            .map_err(|e| EngramError::Internal(format!("query serialization failed: {e}")))?;
        let vector = serde_json::to_string(&query.vector)
            .map_err(|e| EngramError::Internal(format!("vector serialization failed: {e}")))?;
        let fusion = match query.fusion {
            FusionKind::RelativeScore => "relativeScoreFusion",
            FusionKind::Ranked => "rankedFusion",
        };
        Ok(format!(
            "{{ Get {{ {collection}(\
               hybrid: {{ query: {query_text}, vector: {vector}, alpha: {alpha}, \
                          fusionType: {fusion}, properties: [\"content\", \"emotions\"] }}, \
               where: {{ path: [\"session_id\"], operator: Equal, valueText: \"{session}\" }}, \
               limit: {limit} ) {{ \
                 chunk_id content emotions timestamp cognitive_weight \
                 temporal_context {{ start_index end_index session_position \
                   message_indices prev_chunk_id time_span_seconds }} \
                 _additional {{ id score explainScore }} }} }} }}",
            collection = self.collection,
            alpha = query.alpha,
            session = query.session_id,
            limit = query.limit,
        ))
    }

    /// POST to `/v1/graphql`, retrying once on transient upstream errors.
    async fn graphql(&self, document: String) -> Result<Value, EngramError> {
        const MAX_RETRIES: u32 = 1;
        let url = format!("{}/v1/graphql", self.base_url);
        let body = json!({ "query": document });

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                warn!(attempt, "retrying hybrid query after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(Self::send_err)?;

            let status = response.status();
            debug!(status = %status, attempt, "graphql response received");

            if status.is_success() {
                return response.json::<Value>().await.map_err(|e| EngramError::Upstream {
                    service: SERVICE,
                    message: format!("failed to parse graphql response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if matches!(status.as_u16(), 429 | 500 | 503) && attempt < MAX_RETRIES {
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            return Err(EngramError::upstream(
                SERVICE,
                format!("graphql returned {status}: {text}"),
            ));
        }

        Err(EngramError::upstream(SERVICE, "graphql request failed after retries"))
    }
}

#[async_trait]
impl ServiceAdapter for WeaviateStore {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, EngramError> {
        let url = format!("{}/v1/.well-known/ready", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(format!(
                "weaviate readiness probe returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "weaviate readiness probe failed: {e}"
            ))),
        }
    }
}

#[async_trait]
impl VectorIndex for WeaviateStore {
    async fn ensure_schema(&self) -> Result<(), EngramError> {
        let url = format!("{}/v1/schema/{}", self.base_url, self.collection);
        let response = self.client.get(&url).send().await.map_err(Self::send_err)?;

        if response.status().is_success() {
            debug!(collection = %self.collection, "collection already initialized");
            return Ok(());
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngramError::upstream(
                SERVICE,
                format!("schema lookup returned {status}: {text}"),
            ));
        }

        let create_url = format!("{}/v1/schema", self.base_url);
        let response = self
            .client
            .post(&create_url)
            .json(&schema::class_definition(&self.collection))
            .send()
            .await
            .map_err(Self::send_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngramError::upstream(
                SERVICE,
                format!("schema creation returned {status}: {text}"),
            ));
        }
        debug!(collection = %self.collection, "collection created");
        Ok(())
    }

    async fn exists(&self, id: &Uuid) -> Result<bool, EngramError> {
        let url = format!("{}/v1/objects/{}/{}", self.base_url, self.collection, id);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(Self::send_err)?;

        match response.status().as_u16() {
            200 | 204 => Ok(true),
            404 => Ok(false),
            status => Err(EngramError::upstream(
                SERVICE,
                format!("object existence check returned {status}"),
            )),
        }
    }

    async fn insert(&self, chunk: &Chunk, vector: &[f32]) -> Result<(), EngramError> {
        let url = format!("{}/v1/objects", self.base_url);
        let body = json!({
            "class": self.collection,
            "id": chunk.id,
            "vector": vector,
            "properties": {
                "chunk_id": chunk.id,
                "content": chunk.content,
                "session_id": chunk.session_id,
                "username": chunk.usernames,
                "speakers": chunk.speakers,
                "emotions": chunk.emotions,
                "timestamp": chunk.timestamps,
                "cognitive_weight": 1.0,
                "temporal_context": chunk.temporal_context,
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::send_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngramError::upstream(
                SERVICE,
                format!("object insert returned {status}: {text}"),
            ));
        }
        debug!(chunk_id = %chunk.id, "chunk inserted");
        Ok(())
    }

    async fn hybrid(&self, query: &HybridQuery) -> Result<Vec<Candidate>, EngramError> {
        let document = self.hybrid_graphql(query)?;
        let response = self.graphql(document).await?;

        if let Some(errors) = response.get("errors")
            && errors.as_array().is_some_and(|a| !a.is_empty())
        {
            return Err(EngramError::upstream(
                SERVICE,
                format!("graphql errors: {errors}"),
            ));
        }

        let objects = response
            .pointer(&format!("/data/Get/{}", self.collection))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut candidates = Vec::with_capacity(objects.len());
        for mut object in objects {
            let additional = object
                .as_object_mut()
                .and_then(|map| map.remove("_additional"))
                .unwrap_or(Value::Null);

            let id = additional
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let metadata = CandidateMetadata {
                score: parse_score(additional.get("score")),
                explain_score: additional
                    .get("explainScore")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };

            strip_nulls(&mut object);
            // Malformed stored objects degrade to neutral defaults.
            let properties: ChunkProperties =
                serde_json::from_value(object).unwrap_or_default();

            candidates.push(Candidate {
                id,
                properties,
                metadata,
            });
        }
        Ok(candidates)
    }
}

/// Weaviate reports `_additional.score` as a decimal string.
fn parse_score(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Drop explicit nulls so `#[serde(default)]` fields deserialize cleanly.
fn strip_nulls(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|_, v| !v.is_null());
        for v in map.values_mut() {
            strip_nulls(v);
        }
    }
}
