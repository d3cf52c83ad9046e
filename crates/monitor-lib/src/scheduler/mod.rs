//! Monitor scheduler
//!
//! Owns the sampling activity and, in AI mode, the retraining activity.
//! Each activity runs in its own task driven by a tokio interval, so ticks of
//! one activity are serialized while the two activities proceed
//! independently. Stopping is cooperative: a shutdown signal is checked
//! ahead of every tick and a tick that already started runs to completion.

mod retrain;
mod sampling;


use crate::error::MonitorError;
use crate::health::{components, HealthRegistry};
use crate::models::Activity;
use crate::observability::MonitorMetrics;
use crate::predictor::Predictor;
use crate::profile::ConfigProfile;
use crate::sink::{DegradedReport, MonitorEvent, Sink};
use crate::source::MetricsSource;
use retrain::RetrainActivity;
use sampling::SamplingActivity;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// Lifecycle of a monitor loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    Idle,
    Running,
    /// Terminal
    Stopped,
}

/// Counters reported once the loop has stopped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub sampling_ticks: u64,
    pub retrain_rounds: u64,
    pub retrain_failures: u64,
    pub retrain_skipped: u64,
    /// Activities whose in-flight tick was abandoned at shutdown
    pub abandoned: Vec<Activity>,
}

/// Cumulative counters shared between the loop and its activities
#[derive(Debug, Default)]
struct LoopCounters {
    sampling_ticks: AtomicU64,
    retrain_rounds: AtomicU64,
    retrain_failures: AtomicU64,
    retrain_skipped: AtomicU64,
}

/// State shared by both activities for reporting tick outcomes
#[derive(Clone)]
struct TickContext {
    profile: Arc<ConfigProfile>,
    sink: Arc<dyn Sink>,
    health: HealthRegistry,
    metrics: MonitorMetrics,
    counters: Arc<LoopCounters>,
}

impl TickContext {
    /// Hand an event to the sink. Failures go to the log and metrics only.
    async fn deliver(&self, event: MonitorEvent) {
        match self.sink.emit(&event).await {
            Ok(()) => self.health.record_success(components::SINK).await,
            Err(e) => {
                let error = MonitorError::sink_write_failure(&e);
                warn!(event = event.kind(), error = %error, "Dropping event");
                self.metrics.inc_sink_failures();
                self.health
                    .record_failure(components::SINK, error.to_string())
                    .await;
            }
        }
    }

    /// Report a failed capability call as a degraded event
    async fn degrade(&self, activity: Activity, component: &str, error: MonitorError) {
        warn!(
            activity = %activity,
            component = component,
            error = %error,
            "Capability call failed, continuing with next step"
        );

        match error {
            MonitorError::SourceUnavailable(_) => self.metrics.inc_source_failures(),
            MonitorError::PredictorFailure(_) => self.metrics.inc_predictor_failures(),
            _ => {}
        }
        self.health.record_failure(component, error.to_string()).await;

        self.deliver(MonitorEvent::Degraded(DegradedReport {
            timestamp: chrono::Utc::now(),
            activity,
            component: component.to_string(),
            error: error.to_string(),
        }))
        .await;
    }
}

/// A fully assembled monitor that has not started yet
pub struct MonitorLoop {
    ctx: TickContext,
    source: Arc<dyn MetricsSource>,
    predictor: Option<Arc<dyn Predictor>>,
}

impl MonitorLoop {
    pub fn builder() -> MonitorLoopBuilder {
        MonitorLoopBuilder::new()
    }

    pub fn profile(&self) -> &ConfigProfile {
        &self.ctx.profile
    }

    pub fn state(&self) -> LoopState {
        LoopState::Idle
    }

    pub fn health_registry(&self) -> &HealthRegistry {
        &self.ctx.health
    }

    /// Spawn the activities and enter `Running`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> MonitorHandle {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (state_tx, _) = watch::channel(LoopState::Idle);

        let retrain = match (&self.predictor, self.ctx.profile.predictor()) {
            (Some(predictor), Some(config)) => Some(RetrainActivity::new(
                self.ctx.clone(),
                predictor.clone(),
                config.retrain_interval(),
            )),
            _ => None,
        };
        let sampling = SamplingActivity::new(self.ctx.clone(), self.source, self.predictor);

        info!(
            profile = %self.ctx.profile.name(),
            retraining = retrain.is_some(),
            "Starting monitor loop"
        );

        let sampling = tokio::spawn(sampling.run(shutdown_tx.subscribe()));
        let retraining = retrain.map(|activity| tokio::spawn(activity.run(shutdown_tx.subscribe())));
        state_tx.send_replace(LoopState::Running);

        MonitorHandle {
            shutdown_tx,
            state_tx,
            counters: self.ctx.counters,
            sampling,
            retraining,
        }
    }
}

/// Handle to a running monitor loop
///
/// Dropping the handle also stops the activities, without waiting for them.
pub struct MonitorHandle {
    shutdown_tx: broadcast::Sender<()>,
    state_tx: watch::Sender<LoopState>,
    counters: Arc<LoopCounters>,
    sampling: JoinHandle<()>,
    retraining: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn state(&self) -> LoopState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    /// Stop both activities, waiting for any in-flight tick to finish
    pub async fn stop(self) -> LoopSummary {
        self.shutdown(None).await
    }

    /// Stop both activities, abandoning ticks still running after `grace`
    pub async fn stop_within(self, grace: Duration) -> LoopSummary {
        self.shutdown(Some(Instant::now() + grace)).await
    }

    async fn shutdown(self, deadline: Option<Instant>) -> LoopSummary {
        info!("Stopping monitor loop");
        // Fails only when both activities have already exited
        let _ = self.shutdown_tx.send(());

        let mut abandoned = Vec::new();
        if !join_activity(Activity::Sampling, self.sampling, deadline).await {
            abandoned.push(Activity::Sampling);
        }
        if let Some(task) = self.retraining {
            if !join_activity(Activity::Retraining, task, deadline).await {
                abandoned.push(Activity::Retraining);
            }
        }

        self.state_tx.send_replace(LoopState::Stopped);

        let summary = LoopSummary {
            sampling_ticks: self.counters.sampling_ticks.load(Ordering::Relaxed),
            retrain_rounds: self.counters.retrain_rounds.load(Ordering::Relaxed),
            retrain_failures: self.counters.retrain_failures.load(Ordering::Relaxed),
            retrain_skipped: self.counters.retrain_skipped.load(Ordering::Relaxed),
            abandoned,
        };
        info!(
            sampling_ticks = summary.sampling_ticks,
            retrain_rounds = summary.retrain_rounds,
            abandoned = summary.abandoned.len(),
            "Monitor loop stopped"
        );
        summary
    }
}

/// Wait for an activity task to exit. Returns false if it was abandoned.
async fn join_activity(
    activity: Activity,
    mut task: JoinHandle<()>,
    deadline: Option<Instant>,
) -> bool {
    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(activity = %activity, "Tick still in flight at deadline, abandoning");
                task.abort();
                return false;
            }
        },
        None => task.await,
    };

    if let Err(e) = joined {
        warn!(activity = %activity, error = %e, "Activity task ended abnormally");
    }
    true
}

/// Builder for assembling a monitor loop
#[derive(Default)]
pub struct MonitorLoopBuilder {
    profile: Option<ConfigProfile>,
    source: Option<Arc<dyn MetricsSource>>,
    predictor: Option<Arc<dyn Predictor>>,
    sink: Option<Arc<dyn Sink>>,
    health: Option<HealthRegistry>,
}

impl MonitorLoopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile (default: resolved from `NODE_ENV`)
    pub fn profile(mut self, profile: ConfigProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set the metrics source
    pub fn source(mut self, source: Arc<dyn MetricsSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the predictor, required when the profile enables AI mode
    pub fn predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Set the event sink
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Share an existing health registry
    pub fn health_registry(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Build the monitor loop
    pub fn build(self) -> Result<MonitorLoop, MonitorError> {
        let profile = self.profile.unwrap_or_else(ConfigProfile::from_env);
        let source = self
            .source
            .ok_or_else(|| MonitorError::Misconfigured("metrics source is required".into()))?;
        let sink = self
            .sink
            .ok_or_else(|| MonitorError::Misconfigured("sink is required".into()))?;

        let predictor = match (profile.ai_enabled(), self.predictor) {
            (true, None) => {
                return Err(MonitorError::Misconfigured(format!(
                    "profile {} enables AI mode but no predictor was provided",
                    profile.name()
                )))
            }
            (false, Some(_)) => {
                warn!(
                    profile = %profile.name(),
                    "Predictor provided but AI mode is disabled, ignoring it"
                );
                None
            }
            (_, predictor) => predictor,
        };

        Ok(MonitorLoop {
            ctx: TickContext {
                profile: Arc::new(profile),
                sink,
                health: self.health.unwrap_or_default(),
                metrics: MonitorMetrics::new(),
                counters: Arc::new(LoopCounters::default()),
            },
            source,
            predictor,
        })
    }
}
