//! Observability infrastructure for the monitor
//!
//! Provides:
//! - Prometheus metrics (tick counts and latency, capability failures, last verdict)
//! - Structured lifecycle logging with tracing

use crate::models::{Activity, HealthStatus, HealthVerdict};
use crate::profile::ConfigProfile;
use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, Gauge, HistogramVec, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for tick latency (in seconds)
const TICK_LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct MonitorMetricsInner {
    ticks: IntCounterVec,
    tick_latency_seconds: HistogramVec,
    retrain_rounds: IntCounter,
    retrain_skipped: IntCounter,
    source_failures: IntCounter,
    predictor_failures: IntCounter,
    sink_failures: IntCounter,
    predictive_alerts: IntCounter,
    max_usage_percent: Gauge,
    health_warning: IntGauge,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            ticks: register_int_counter_vec!(
                "devops_monitor_ticks_total",
                "Ticks executed per activity",
                &["activity"]
            )
            .expect("Failed to register ticks_total"),

            tick_latency_seconds: register_histogram_vec!(
                "devops_monitor_tick_latency_seconds",
                "Time spent executing one tick body",
                &["activity"],
                TICK_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register tick_latency_seconds"),

            retrain_rounds: register_int_counter!(
                "devops_monitor_retrain_rounds_total",
                "Completed model retrain rounds"
            )
            .expect("Failed to register retrain_rounds_total"),

            retrain_skipped: register_int_counter!(
                "devops_monitor_retrain_skipped_total",
                "Retrain ticks skipped because a refresh was still running"
            )
            .expect("Failed to register retrain_skipped_total"),

            source_failures: register_int_counter!(
                "devops_monitor_source_failures_total",
                "Metrics source calls that failed"
            )
            .expect("Failed to register source_failures_total"),

            predictor_failures: register_int_counter!(
                "devops_monitor_predictor_failures_total",
                "Predictor calls that failed"
            )
            .expect("Failed to register predictor_failures_total"),

            sink_failures: register_int_counter!(
                "devops_monitor_sink_failures_total",
                "Events the sink failed to deliver"
            )
            .expect("Failed to register sink_failures_total"),

            predictive_alerts: register_int_counter!(
                "devops_monitor_predictive_alerts_total",
                "Predictive alerts raised"
            )
            .expect("Failed to register predictive_alerts_total"),

            max_usage_percent: register_gauge!(
                "devops_monitor_max_usage_percent",
                "Highest resource usage in the most recent snapshot"
            )
            .expect("Failed to register max_usage_percent"),

            health_warning: register_int_gauge!(
                "devops_monitor_health_warning",
                "1 if the most recent verdict was a warning, 0 otherwise"
            )
            .expect("Failed to register health_warning"),
        }
    }
}

/// Monitor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MonitorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorMetrics").finish_non_exhaustive()
    }
}

impl MonitorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new)
    }

    /// Record one executed tick and how long its body took
    pub fn observe_tick(&self, activity: Activity, duration_secs: f64) {
        let label = activity.to_string();
        self.inner().ticks.with_label_values(&[label.as_str()]).inc();
        self.inner()
            .tick_latency_seconds
            .with_label_values(&[label.as_str()])
            .observe(duration_secs);
    }

    pub fn ticks(&self, activity: Activity) -> u64 {
        self.inner()
            .ticks
            .with_label_values(&[activity.to_string().as_str()])
            .get()
    }

    pub fn inc_retrain_rounds(&self) {
        self.inner().retrain_rounds.inc();
    }

    pub fn inc_retrain_skipped(&self) {
        self.inner().retrain_skipped.inc();
    }

    pub fn inc_source_failures(&self) {
        self.inner().source_failures.inc();
    }

    pub fn inc_predictor_failures(&self) {
        self.inner().predictor_failures.inc();
    }

    pub fn inc_sink_failures(&self) {
        self.inner().sink_failures.inc();
    }

    pub fn sink_failures(&self) -> u64 {
        self.inner().sink_failures.get()
    }

    pub fn inc_predictive_alerts(&self) {
        self.inner().predictive_alerts.inc();
    }

    /// Publish the latest verdict
    pub fn set_verdict(&self, verdict: &HealthVerdict) {
        self.inner().max_usage_percent.set(verdict.max_usage);
        self.inner()
            .health_warning
            .set(i64::from(verdict.status == HealthStatus::Warning));
    }
}

/// Structured logger for monitor lifecycle events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    profile: String,
}

impl StructuredLogger {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    /// Log monitor startup with the resolved profile
    pub fn log_startup(&self, version: &str, profile: &ConfigProfile) {
        info!(
            event = "monitor_started",
            profile = %self.profile,
            version = %version,
            interval_ms = profile.sample_interval().as_millis() as u64,
            alert_threshold_percent = profile.alert_threshold_percent(),
            debug_mode = profile.debug_mode(),
            verbose_logging = profile.verbose_logging(),
            ai_enabled = profile.ai_enabled(),
            "Monitor started ({} mode)",
            self.profile.to_uppercase()
        );
    }

    /// Log that a predictor model is ready
    pub fn log_model_loaded(&self, model_path: &str, predictive_window_secs: u64) {
        info!(
            event = "model_loaded",
            profile = %self.profile,
            model_path = %model_path,
            predictive_window_secs = predictive_window_secs,
            "AI anomaly detection ready"
        );
    }

    /// Log monitor shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "monitor_shutdown",
            profile = %self.profile,
            reason = %reason,
            "Monitor shutting down"
        );
    }

    /// Log an activity abandoned at shutdown because its tick never finished
    pub fn log_abandoned(&self, activity: Activity) {
        warn!(
            event = "activity_abandoned",
            profile = %self.profile,
            activity = %activity,
            "Tick still in flight after shutdown grace period, abandoning"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::models::ResourceSnapshot;

    #[test]
    fn test_monitor_metrics_handles_share_state() {
        let metrics = MonitorMetrics::new();
        let other = metrics.clone();

        let before = metrics.sink_failures();
        other.inc_sink_failures();
        assert!(metrics.sink_failures() > before);

        metrics.observe_tick(Activity::Sampling, 0.01);
        assert!(metrics.ticks(Activity::Sampling) >= 1);

        metrics.set_verdict(&evaluate(ResourceSnapshot::new(90.0, 0.0, 0.0), 80.0));
        metrics.inc_retrain_rounds();
        metrics.inc_predictive_alerts();
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("experimental");
        assert_eq!(logger.profile, "experimental");
        logger.log_startup("0.1.0", &ConfigProfile::experimental());
    }
}
