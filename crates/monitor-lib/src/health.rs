//! Component health tracking
//!
//! The scheduler records every capability call outcome here. A failure
//! marks the component degraded until its next successful call; there is no
//! automatic escalation.

use crate::models::HealthVerdict;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Last call succeeded
    Healthy,
    /// Last call failed
    Degraded,
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub consecutive_failures: u32,
    pub total_failures: u64,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            consecutive_failures: 0,
            total_failures: 0,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    fn succeed(&mut self) {
        self.status = ComponentStatus::Healthy;
        self.message = None;
        self.consecutive_failures = 0;
        self.last_check_timestamp = chrono::Utc::now().timestamp();
    }

    fn fail(&mut self, message: String) {
        self.status = ComponentStatus::Degraded;
        self.message = Some(message);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.last_check_timestamp = chrono::Utc::now().timestamp();
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_verdict: Option<HealthVerdict>,
}

impl HealthResponse {
    /// Degraded if any component is degraded
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        if components
            .values()
            .any(|health| health.status == ComponentStatus::Degraded)
        {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

/// Component names for health tracking
pub mod components {
    pub const SOURCE: &str = "metrics_source";
    pub const PREDICTOR: &str = "predictor";
    pub const SINK: &str = "sink";
}

/// Shared registry of component health and the most recent verdict
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    latest_verdict: Arc<RwLock<Option<HealthVerdict>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        let mut components = self.components.write().await;
        components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::healthy);
    }

    /// Record a successful call, registering the component if needed
    pub async fn record_success(&self, name: &str) {
        let mut components = self.components.write().await;
        components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::healthy)
            .succeed();
    }

    /// Record a failed call, registering the component if needed
    pub async fn record_failure(&self, name: &str, message: impl Into<String>) {
        let mut components = self.components.write().await;
        components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::healthy)
            .fail(message.into());
    }

    pub async fn record_verdict(&self, verdict: HealthVerdict) {
        *self.latest_verdict.write().await = Some(verdict);
    }

    pub async fn latest_verdict(&self) -> Option<HealthVerdict> {
        *self.latest_verdict.read().await
    }

    pub async fn component(&self, name: &str) -> Option<ComponentHealth> {
        self.components.read().await.get(name).cloned()
    }

    /// Get health response
    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse {
            status,
            components,
            latest_verdict: self.latest_verdict().await,
        }
    }
}
