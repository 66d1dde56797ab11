// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for the model microservice clients.
//!
//! All three services expose JSON POST endpoints plus a `GET /health`
//! probe. Transient upstream errors (429, 500, 503, 529) are retried once
//! after a 1-second delay.

use std::time::Duration;

use engram_core::{EngramError, HealthStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Build a reqwest client with the configured per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, EngramError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EngramError::Upstream {
            service: "http",
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

/// POST a JSON body and deserialize a JSON response.
///
/// On transient errors, retries once after a 1-second delay.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    service: &'static str,
    body: &B,
) -> Result<R, EngramError>
where
    B: Serialize,
    R: DeserializeOwned,
{
    const MAX_RETRIES: u32 = 1;
    let mut last_error = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            warn!(service, attempt, "retrying request after transient error");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        let response = client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| EngramError::Upstream {
                service,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(service, status = %status, attempt, "response received");

        if status.is_success() {
            let text = response.text().await.map_err(|e| EngramError::Upstream {
                service,
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;
            return serde_json::from_str(&text).map_err(|e| EngramError::Upstream {
                service,
                message: format!("failed to parse response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        if is_transient_error(status) && attempt < MAX_RETRIES {
            let body = response.text().await.unwrap_or_default();
            warn!(service, status = %status, body = %body, "transient error, will retry");
            last_error = Some(EngramError::upstream(
                service,
                format!("service returned {status}: {body}"),
            ));
            continue;
        }

        let body = response.text().await.unwrap_or_default();
        return Err(EngramError::upstream(
            service,
            format!("service returned {status}: {body}"),
        ));
    }

    Err(last_error
        .unwrap_or_else(|| EngramError::upstream(service, "request failed after retries")))
}

/// Probe `GET {base_url}/health`, mapping any failure to Unhealthy.
pub(crate) async fn probe_health(
    client: &reqwest::Client,
    base_url: &str,
    service: &'static str,
) -> Result<HealthStatus, EngramError> {
    let url = format!("{base_url}/health");
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
        Ok(response) => Ok(HealthStatus::Unhealthy(format!(
            "{service} health probe returned {}",
            response.status()
        ))),
        Err(e) => Ok(HealthStatus::Unhealthy(format!(
            "{service} health probe failed: {e}"
        ))),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

/// Strip a trailing slash so endpoint joins stay canonical.
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
