use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use super::mode::ReasoningMode;
use crate::config::{LATENCY_FAILURE_MS, SENTINEL_RUNS, SENTINEL_TIMEOUT};

/// One averaged measurement cycle. Never reused across calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkReading {
    pub latency_ms: f64,
}

impl NetworkReading {
    pub fn failed() -> Self {
        Self {
            latency_ms: LATENCY_FAILURE_MS,
        }
    }
}

pub fn classify(reading: NetworkReading) -> ReasoningMode {
    ReasoningMode::from_latency(reading.latency_ms)
}

/// Source of latency readings. Must not fail: errors map to the worst-case reading.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn measure(&self) -> NetworkReading;
}

/// Times plain GET round trips against a well-known endpoint.
pub struct LatencySentinel {
    client: reqwest::Client,
    target: String,
    runs: usize,
}

impl LatencySentinel {
    pub fn new(target: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SENTINEL_TIMEOUT)
            .build()
            .context("Failed to create sentinel HTTP client")?;
        Ok(Self {
            client,
            target: target.to_string(),
            runs: SENTINEL_RUNS,
        })
    }

    async fn ping_once(&self) -> Result<f64> {
        let start = Instant::now();
        // Any HTTP status counts as a round trip; only transport errors fail.
        self.client
            .get(&self.target)
            .timeout(SENTINEL_TIMEOUT)
            .send()
            .await
            .context("sentinel ping failed")?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

#[async_trait]
impl NetworkProbe for LatencySentinel {
    async fn measure(&self) -> NetworkReading {
        let mut samples = Vec::with_capacity(self.runs);
        for _ in 0..self.runs {
            match self.ping_once().await {
                Ok(ms) => samples.push(ms),
                Err(e) => {
                    warn!(target_url = %self.target, "Latency probe failed: {:#}", e);
                    return NetworkReading::failed();
                }
            }
        }
        if samples.is_empty() {
            return NetworkReading::failed();
        }

        let latency_ms = samples.iter().sum::<f64>() / samples.len() as f64;
        let reading = NetworkReading { latency_ms };
        info!(
            latency_ms = latency_ms as u64,
            mode = %classify(reading),
            "Network sentinel reading"
        );
        reading
    }
}
