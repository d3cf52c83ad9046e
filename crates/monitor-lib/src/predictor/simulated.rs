//! Randomized predictor used when no real model is available

use super::Predictor;
use crate::error::MonitorError;
use crate::models::{
    Prediction, RetrainOutcome, RetrainResult, MAX_CONFIDENCE_PERCENT, MIN_CONFIDENCE_PERCENT,
};
use crate::profile::PredictorConfig;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use url::Url;

/// Accuracy reported after every simulated retrain
pub const SIMULATED_ACCURACY_PERCENT: f64 = 94.7;

/// Upper bound for simulated traffic, in requests per second
const MAX_TRAFFIC_RPS: f64 = 1000.0;

/// Predictor producing uniformly random estimates
#[derive(Debug)]
pub struct SimulatedPredictor {
    model_path: PathBuf,
    metrics_endpoint: Url,
    retrain_rounds: AtomicU64,
}

impl SimulatedPredictor {
    /// "Load" the model described by `config`
    ///
    /// Fails only if the metrics endpoint is not a valid URL.
    pub fn load(config: &PredictorConfig) -> Result<Self, MonitorError> {
        let metrics_endpoint =
            Url::parse(config.metrics_endpoint()).map_err(|source| {
                MonitorError::InvalidEndpoint {
                    endpoint: config.metrics_endpoint().to_string(),
                    source,
                }
            })?;

        info!(
            model_path = %config.model_path().display(),
            metrics_endpoint = %metrics_endpoint,
            "Simulated predictor ready"
        );

        Ok(Self {
            model_path: config.model_path().to_path_buf(),
            metrics_endpoint,
            retrain_rounds: AtomicU64::new(0),
        })
    }

    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    pub fn metrics_endpoint(&self) -> &Url {
        &self.metrics_endpoint
    }

    /// Number of completed retrain rounds
    pub fn retrain_rounds(&self) -> u64 {
        self.retrain_rounds.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Predictor for SimulatedPredictor {
    async fn predict(&self, config: &PredictorConfig) -> Result<Prediction> {
        let mut rng = rand::thread_rng();
        Ok(Prediction {
            horizon_secs: config.predictive_window_secs(),
            predicted_cpu: rng.gen_range(0.0..100.0),
            predicted_mem: rng.gen_range(0.0..100.0),
            predicted_traffic: rng.gen_range(0.0..MAX_TRAFFIC_RPS),
            confidence_percent: rng.gen_range(MIN_CONFIDENCE_PERCENT..=MAX_CONFIDENCE_PERCENT),
        })
    }

    async fn retrain(&self) -> Result<RetrainOutcome> {
        let round = self.retrain_rounds.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(round, "Simulated retrain complete");
        Ok(RetrainOutcome::Completed(RetrainResult {
            accuracy_percent: SIMULATED_ACCURACY_PERCENT,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ConfigProfile;

    fn experimental_config() -> PredictorConfig {
        ConfigProfile::experimental().predictor().unwrap().clone()
    }

    #[test]
    fn test_load_parses_endpoint() {
        let predictor = SimulatedPredictor::load(&experimental_config()).unwrap();
        assert_eq!(predictor.metrics_endpoint().port(), Some(9000));
        assert_eq!(predictor.metrics_endpoint().path(), "/metrics");
        assert!(predictor.model_path().ends_with("anomaly-detection.h5"));
    }

    #[tokio::test]
    async fn test_predictions_within_bounds() {
        let config = experimental_config();
        let predictor = SimulatedPredictor::load(&config).unwrap();

        for _ in 0..200 {
            let prediction = predictor.predict(&config).await.unwrap();
            assert_eq!(prediction.horizon_secs, 300);
            assert!(prediction.has_valid_confidence());
            assert!((0.0..100.0).contains(&prediction.predicted_cpu));
            assert!((0.0..MAX_TRAFFIC_RPS).contains(&prediction.predicted_traffic));
        }
    }

    #[tokio::test]
    async fn test_retrain_is_repeatable() {
        let predictor = SimulatedPredictor::load(&experimental_config()).unwrap();

        for _ in 0..3 {
            let outcome = predictor.retrain().await.unwrap();
            assert_eq!(
                outcome,
                RetrainOutcome::Completed(RetrainResult {
                    accuracy_percent: SIMULATED_ACCURACY_PERCENT
                })
            );
        }
        assert_eq!(predictor.retrain_rounds(), 3);
    }
}
