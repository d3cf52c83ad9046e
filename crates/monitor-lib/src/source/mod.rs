//! Metric sources
//!
//! The monitor never reads the operating system directly; it asks an
//! injected [`MetricsSource`] for snapshots and cloud region status.

mod simulated;

pub use simulated::SimulatedSource;

use crate::models::{CloudRegionStatus, ResourceSnapshot};
use anyhow::Result;

pub use async_trait::async_trait;

/// Trait for resource metric providers
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Take a fresh resource snapshot
    async fn snapshot(&self) -> Result<ResourceSnapshot>;

    /// Query the status of one cloud provider
    async fn cloud_status(&self, provider: &str) -> Result<CloudRegionStatus>;
}
