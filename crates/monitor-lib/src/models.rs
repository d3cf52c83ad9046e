//! Core data models for the health monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time resource usage, all values in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub disk_percent: f64,
}

impl ResourceSnapshot {
    /// Create a snapshot stamped now, clamping each value into 0..=100
    pub fn new(cpu_percent: f64, mem_percent: f64, disk_percent: f64) -> Self {
        Self::at(Utc::now(), cpu_percent, mem_percent, disk_percent)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        cpu_percent: f64,
        mem_percent: f64,
        disk_percent: f64,
    ) -> Self {
        Self {
            timestamp,
            cpu_percent: clamp_percent(cpu_percent),
            mem_percent: clamp_percent(mem_percent),
            disk_percent: clamp_percent(disk_percent),
        }
    }

    /// Highest of the three usage values
    pub fn max_usage(&self) -> f64 {
        self.cpu_percent
            .max(self.mem_percent)
            .max(self.disk_percent)
    }

    /// Whether every value is a percentage in 0..=100 (NaN is not)
    pub fn is_valid(&self) -> bool {
        [self.cpu_percent, self.mem_percent, self.disk_percent]
            .iter()
            .all(|value| (0.0..=100.0).contains(value))
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Health classification of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Warning => write!(f, "WARNING"),
        }
    }
}

/// Verdict derived from a snapshot and a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub max_usage: f64,
    pub snapshot: ResourceSnapshot,
}

/// Forward-looking estimate produced by a predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub horizon_secs: u64,
    pub predicted_cpu: f64,
    pub predicted_mem: f64,
    pub predicted_traffic: f64,
    pub confidence_percent: f64,
}

/// Lowest confidence a predictor may report
pub const MIN_CONFIDENCE_PERCENT: f64 = 70.0;

/// Highest confidence a predictor may report
pub const MAX_CONFIDENCE_PERCENT: f64 = 100.0;

impl Prediction {
    /// Whether the reported confidence is inside the allowed band
    pub fn has_valid_confidence(&self) -> bool {
        (MIN_CONFIDENCE_PERCENT..=MAX_CONFIDENCE_PERCENT).contains(&self.confidence_percent)
    }
}

/// Status of one cloud provider region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudRegionStatus {
    pub provider: String,
    pub instance_count: u32,
    pub load_percent: f64,
    pub healthy: bool,
}

/// Result of a completed model refresh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrainResult {
    pub accuracy_percent: f64,
}

/// What a retrain request produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrainOutcome {
    /// The refresh finished
    Completed(RetrainResult),
    /// A previous refresh is still running; nothing new to report
    InProgress,
}

/// The two periodic activities run by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Sampling,
    Retraining,
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activity::Sampling => write!(f, "sampling"),
            Activity::Retraining => write!(f, "retraining"),
        }
    }
}
