//! Sampling activity
//!
//! One tick: cloud status per provider (AI mode), snapshot and verdict,
//! then prediction and the predictive alert check (AI mode). Each step's
//! sink write completes before the next step begins.

use super::TickContext;
use crate::error::MonitorError;
use crate::evaluator::{evaluate, exceeds_predictive_threshold};
use crate::health::components;
use crate::models::{Activity, HealthStatus};
use crate::predictor::Predictor;
use crate::profile::PredictorConfig;
use crate::sink::{CloudStatusReport, HealthReport, MonitorEvent, PredictionReport, PredictiveAlert};
use crate::source::MetricsSource;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub(super) struct SamplingActivity {
    ctx: TickContext,
    source: Arc<dyn MetricsSource>,
    predictor: Option<Arc<dyn Predictor>>,
}

impl SamplingActivity {
    pub(super) fn new(
        ctx: TickContext,
        source: Arc<dyn MetricsSource>,
        predictor: Option<Arc<dyn Predictor>>,
    ) -> Self {
        Self {
            ctx,
            source,
            predictor,
        }
    }

    /// Tick immediately, then every sample interval until shutdown
    pub(super) async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let period = self.ctx.profile.sample_interval();
        info!(
            interval_ms = period.as_millis() as u64,
            alert_threshold_percent = self.ctx.profile.alert_threshold_percent(),
            ai_enabled = self.ai_path().is_some(),
            "Starting sampling activity"
        );

        let mut ticker = interval(period);
        // A slow tick pushes the schedule back instead of bursting to catch up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("Shutting down sampling activity");
                    break;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    pub(super) async fn tick(&self) {
        let start = Instant::now();
        let tick = self.ctx.counters.sampling_ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let ai = self.ai_path();

        // Source health is recorded once per tick; any failed query leaves it degraded
        let mut source_ok = true;
        if let Some((_, config)) = ai {
            source_ok &= self.report_cloud_status(config).await;
        }
        source_ok &= self.check_health().await;
        if source_ok {
            self.ctx.health.record_success(components::SOURCE).await;
        }

        if let Some((predictor, config)) = ai {
            self.predict(predictor, config).await;
        }

        let elapsed = start.elapsed();
        self.ctx
            .metrics
            .observe_tick(Activity::Sampling, elapsed.as_secs_f64());
        debug!(tick, elapsed_ms = elapsed.as_millis() as u64, "Sampling tick complete");
    }

    fn ai_path(&self) -> Option<(&dyn Predictor, &PredictorConfig)> {
        match (&self.predictor, self.ctx.profile.predictor()) {
            (Some(predictor), Some(config)) => Some((predictor.as_ref(), config)),
            _ => None,
        }
    }

    /// Returns false if any provider query failed
    async fn report_cloud_status(&self, config: &PredictorConfig) -> bool {
        let mut all_ok = true;
        for provider in config.cloud_providers() {
            match self.source.cloud_status(provider).await {
                Ok(status) => {
                    self.ctx
                        .deliver(MonitorEvent::CloudStatusReport(CloudStatusReport::from(
                            status,
                        )))
                        .await;
                }
                Err(e) => {
                    let error = MonitorError::source_unavailable(&e.context(format!(
                        "cloud status for {}",
                        provider
                    )));
                    self.ctx
                        .degrade(Activity::Sampling, components::SOURCE, error)
                        .await;
                    all_ok = false;
                }
            }
        }
        all_ok
    }

    /// Returns false if the source failed or produced an invalid snapshot
    async fn check_health(&self) -> bool {
        let snapshot = match self.source.snapshot().await {
            Ok(snapshot) if snapshot.is_valid() => snapshot,
            Ok(snapshot) => {
                let error = MonitorError::SourceUnavailable(format!(
                    "snapshot out of range (cpu {}%, mem {}%, disk {}%)",
                    snapshot.cpu_percent, snapshot.mem_percent, snapshot.disk_percent
                ));
                self.ctx
                    .degrade(Activity::Sampling, components::SOURCE, error)
                    .await;
                return false;
            }
            Err(e) => {
                self.ctx
                    .degrade(
                        Activity::Sampling,
                        components::SOURCE,
                        MonitorError::source_unavailable(&e),
                    )
                    .await;
                return false;
            }
        };

        let profile = &self.ctx.profile;
        let verdict = evaluate(snapshot, profile.alert_threshold_percent());
        self.ctx.metrics.set_verdict(&verdict);
        self.ctx.health.record_verdict(verdict).await;

        if verdict.status == HealthStatus::Warning {
            info!(
                max_usage = verdict.max_usage,
                threshold = profile.alert_threshold_percent(),
                "Resource usage above threshold"
            );
        }

        self.ctx
            .deliver(MonitorEvent::HealthReport(
                HealthReport::from_verdict(&verdict, profile.debug_mode())
                    .with_ai_analysis(self.ai_path().is_some()),
            ))
            .await;
        true
    }

    async fn predict(&self, predictor: &dyn Predictor, config: &PredictorConfig) {
        let prediction = match predictor.predict(config).await {
            Ok(prediction) if prediction.has_valid_confidence() => prediction,
            Ok(prediction) => {
                let error = MonitorError::PredictorFailure(format!(
                    "confidence {:.2}% outside 70..=100",
                    prediction.confidence_percent
                ));
                self.ctx
                    .degrade(Activity::Sampling, components::PREDICTOR, error)
                    .await;
                return;
            }
            Err(e) => {
                self.ctx
                    .degrade(
                        Activity::Sampling,
                        components::PREDICTOR,
                        MonitorError::predictor_failure(&e),
                    )
                    .await;
                return;
            }
        };
        self.ctx.health.record_success(components::PREDICTOR).await;

        self.ctx
            .deliver(MonitorEvent::PredictionReport(PredictionReport::from(
                &prediction,
            )))
            .await;

        let threshold = self.ctx.profile.alert_threshold_percent();
        if exceeds_predictive_threshold(&prediction, threshold) {
            self.ctx.metrics.inc_predictive_alerts();
            info!(
                predicted_cpu = prediction.predicted_cpu,
                threshold,
                horizon_secs = prediction.horizon_secs,
                "High CPU expected, raising predictive alert"
            );
            self.ctx
                .deliver(MonitorEvent::PredictiveAlert(PredictiveAlert {
                    predicted_cpu: prediction.predicted_cpu,
                    threshold,
                }))
                .await;
        }
    }
}
