//! Retraining activity
//!
//! Runs on its own cadence, first firing one full interval after start. A
//! retrain that is still in progress skips the tick instead of queueing.

use super::TickContext;
use crate::error::MonitorError;
use crate::health::components;
use crate::models::{Activity, RetrainOutcome};
use crate::predictor::Predictor;
use crate::sink::{MonitorEvent, RetrainReport};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub(super) struct RetrainActivity {
    ctx: TickContext,
    predictor: Arc<dyn Predictor>,
    period: Duration,
}

impl RetrainActivity {
    pub(super) fn new(ctx: TickContext, predictor: Arc<dyn Predictor>, period: Duration) -> Self {
        Self {
            ctx,
            predictor,
            period,
        }
    }

    pub(super) async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_ms = self.period.as_millis() as u64,
            "Starting retraining activity"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("Shutting down retraining activity");
                    break;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    pub(super) async fn tick(&self) {
        let start = Instant::now();
        let counters = &self.ctx.counters;

        match self.predictor.retrain().await {
            Ok(RetrainOutcome::Completed(result)) => {
                let round = counters.retrain_rounds.fetch_add(1, Ordering::Relaxed) + 1;
                self.ctx.health.record_success(components::PREDICTOR).await;
                self.ctx.metrics.inc_retrain_rounds();
                info!(
                    round,
                    accuracy_percent = result.accuracy_percent,
                    "Model retrained"
                );
                self.ctx
                    .deliver(MonitorEvent::RetrainReport(RetrainReport {
                        accuracy_percent: result.accuracy_percent,
                        round,
                    }))
                    .await;
            }
            Ok(RetrainOutcome::InProgress) => {
                counters.retrain_skipped.fetch_add(1, Ordering::Relaxed);
                self.ctx.metrics.inc_retrain_skipped();
                debug!("Previous retrain still running, skipping tick");
            }
            Err(e) => {
                counters.retrain_failures.fetch_add(1, Ordering::Relaxed);
                self.ctx
                    .degrade(
                        Activity::Retraining,
                        components::PREDICTOR,
                        MonitorError::predictor_failure(&e),
                    )
                    .await;
            }
        }

        self.ctx
            .metrics
            .observe_tick(Activity::Retraining, start.elapsed().as_secs_f64());
    }
}
