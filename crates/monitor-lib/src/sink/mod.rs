//! Event sinks
//!
//! Every observable outcome of a tick is a [`MonitorEvent`] handed to an
//! injected [`Sink`]. Rendering is the sink's concern; the scheduler only
//! guarantees which events are emitted and in what order.

mod channel;
mod console;

pub use channel::ChannelSink;
pub use console::{render_text, ConsoleSink, RenderFormat};

use crate::models::{Activity, CloudRegionStatus, HealthStatus, HealthVerdict, Prediction};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trait for event consumers
///
/// The sampling and retraining activities emit concurrently, so
/// implementations must serialize their writes.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn emit(&self, event: &MonitorEvent) -> Result<()>;
}

/// Structured event emitted by the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    HealthReport(HealthReport),
    CloudStatusReport(CloudStatusReport),
    PredictionReport(PredictionReport),
    PredictiveAlert(PredictiveAlert),
    RetrainReport(RetrainReport),
    Degraded(DegradedReport),
}

impl MonitorEvent {
    /// Short event name, matching the serialized tag
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::HealthReport(_) => "health_report",
            MonitorEvent::CloudStatusReport(_) => "cloud_status_report",
            MonitorEvent::PredictionReport(_) => "prediction_report",
            MonitorEvent::PredictiveAlert(_) => "predictive_alert",
            MonitorEvent::RetrainReport(_) => "retrain_report",
            MonitorEvent::Degraded(_) => "degraded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub status: HealthStatus,
    pub max_usage: f64,
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
    pub debug_flags_active: bool,
    /// Produced by an AI-mode tick
    #[serde(default)]
    pub ai_analysis: bool,
}

impl HealthReport {
    pub fn from_verdict(verdict: &HealthVerdict, debug_flags_active: bool) -> Self {
        Self {
            timestamp: verdict.snapshot.timestamp,
            status: verdict.status,
            max_usage: verdict.max_usage,
            cpu: verdict.snapshot.cpu_percent,
            mem: verdict.snapshot.mem_percent,
            disk: verdict.snapshot.disk_percent,
            debug_flags_active,
            ai_analysis: false,
        }
    }

    pub fn with_ai_analysis(mut self, ai_analysis: bool) -> Self {
        self.ai_analysis = ai_analysis;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudStatusReport {
    pub provider: String,
    pub instances: u32,
    pub load: f64,
    pub healthy: bool,
}

impl From<CloudRegionStatus> for CloudStatusReport {
    fn from(status: CloudRegionStatus) -> Self {
        Self {
            provider: status.provider,
            instances: status.instance_count,
            load: status.load_percent,
            healthy: status.healthy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub horizon_secs: u64,
    pub predicted_cpu: f64,
    pub predicted_mem: f64,
    pub predicted_traffic: f64,
    pub confidence: f64,
}

impl From<&Prediction> for PredictionReport {
    fn from(prediction: &Prediction) -> Self {
        Self {
            horizon_secs: prediction.horizon_secs,
            predicted_cpu: prediction.predicted_cpu,
            predicted_mem: prediction.predicted_mem,
            predicted_traffic: prediction.predicted_traffic,
            confidence: prediction.confidence_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveAlert {
    pub predicted_cpu: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainReport {
    pub accuracy_percent: f64,
    /// Completed retrain rounds since the loop started, including this one
    pub round: u64,
}

/// A capability call failed during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedReport {
    pub timestamp: DateTime<Utc>,
    pub activity: Activity,
    pub component: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::models::ResourceSnapshot;

    #[test]
    fn test_health_report_from_verdict() {
        let verdict = evaluate(ResourceSnapshot::new(95.0, 40.0, 10.0), 90.0);
        let report = HealthReport::from_verdict(&verdict, true);

        assert_eq!(report.status, HealthStatus::Warning);
        assert_eq!(report.max_usage, 95.0);
        assert_eq!(report.cpu, 95.0);
        assert_eq!(report.mem, 40.0);
        assert_eq!(report.disk, 10.0);
        assert!(report.debug_flags_active);
    }

    #[test]
    fn test_event_tagging() {
        let event = MonitorEvent::PredictiveAlert(PredictiveAlert {
            predicted_cpu: 78.0,
            threshold: 75.0,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "predictive_alert");
        assert_eq!(value["predicted_cpu"], 78.0);
        assert_eq!(event.kind(), "predictive_alert");

        let parsed: MonitorEvent = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_cloud_status_conversion() {
        let report = CloudStatusReport::from(CloudRegionStatus {
            provider: "gcp".to_string(),
            instance_count: 7,
            load_percent: 42.5,
            healthy: false,
        });

        assert_eq!(report.provider, "gcp");
        assert_eq!(report.instances, 7);
        assert!(!report.healthy);
    }
}
