// ABOUTME: Readiness polling against the backend health endpoint.
// ABOUTME: Fixed-interval bounded probing, no backoff.

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Poll `url` until it answers without an HTTP error, probing up to
/// `attempts` times spaced `interval` apart. Each probe carries its own
/// request `timeout` so a hung check cannot stall the loop. Returns the
/// 1-based attempt number that succeeded.
pub async fn wait_ready(
    url: &str,
    attempts: u32,
    interval: Duration,
    timeout: Duration,
) -> Result<u32> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build readiness probe client")?;

    for attempt in 1..=attempts {
        match client.get(url).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => {
                    tracing::info!(url, attempt, status = %resp.status(), "Backend ready");
                    return Ok(attempt);
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Backend not ready");
                }
            },
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Backend not reachable");
            }
        }
        if attempt < attempts {
            sleep(interval).await;
        }
    }

    bail!("Backend at {url} failed readiness after {attempts} probes")
}
