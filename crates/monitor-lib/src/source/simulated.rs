//! Randomized metric source
//!
//! Produces uniformly distributed usage figures so the monitor can run
//! without a real metrics back-end.

use super::MetricsSource;
use crate::models::{CloudRegionStatus, ResourceSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

/// Probability that a simulated cloud region reports healthy
const CLOUD_HEALTHY_PROBABILITY: f64 = 0.9;

/// Metrics source backed by a random number generator
#[derive(Debug, Default, Clone)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSource for SimulatedSource {
    async fn snapshot(&self) -> Result<ResourceSnapshot> {
        let mut rng = rand::thread_rng();
        Ok(ResourceSnapshot::new(
            rng.gen_range(0.0..100.0),
            rng.gen_range(0.0..100.0),
            rng.gen_range(0.0..100.0),
        ))
    }

    async fn cloud_status(&self, provider: &str) -> Result<CloudRegionStatus> {
        let mut rng = rand::thread_rng();
        Ok(CloudRegionStatus {
            provider: provider.to_string(),
            instance_count: rng.gen_range(5..15),
            load_percent: rng.gen_range(0.0..100.0),
            healthy: rng.gen_bool(CLOUD_HEALTHY_PROBABILITY),
        })
    }
}
