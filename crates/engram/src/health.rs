// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `engram health` command implementation.
//!
//! Probes every external service concurrently and prints one line per
//! adapter. Exit status reflects the worst result.

use std::sync::Arc;
use std::time::Instant;

use engram_core::{HealthStatus, ServiceAdapter};
use futures::future::join_all;

/// Outcome of one adapter probe.
pub struct CheckResult {
    pub name: String,
    pub status: HealthStatus,
    pub elapsed_ms: u128,
}

/// Probe all adapters concurrently.
pub async fn run_checks(adapters: &[Arc<dyn ServiceAdapter>]) -> Vec<CheckResult> {
    let probes = adapters.iter().map(|adapter| {
        let adapter = Arc::clone(adapter);
        async move {
            let started = Instant::now();
            let status = adapter
                .health_check()
                .await
                .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
            CheckResult {
                name: adapter.name().to_string(),
                status,
                elapsed_ms: started.elapsed().as_millis(),
            }
        }
    });
    join_all(probes).await
}

/// Print results and report whether every service is healthy.
pub fn report(results: &[CheckResult]) -> bool {
    let mut all_healthy = true;
    println!();
    println!("  engram health");
    println!("  {}", "-".repeat(50));
    for result in results {
        let line = match &result.status {
            HealthStatus::Healthy => {
                format!("    [OK]   {:<12} ({}ms)", result.name, result.elapsed_ms)
            }
            HealthStatus::Degraded(reason) => {
                format!(
                    "    [WARN] {:<12} {} ({}ms)",
                    result.name, reason, result.elapsed_ms
                )
            }
            HealthStatus::Unhealthy(reason) => {
                all_healthy = false;
                format!(
                    "    [FAIL] {:<12} {} ({}ms)",
                    result.name, reason, result.elapsed_ms
                )
            }
        };
        println!("{line}");
    }
    println!();
    all_healthy
}
