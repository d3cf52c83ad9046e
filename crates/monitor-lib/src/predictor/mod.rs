//! Prediction engine interface

mod simulated;

pub use simulated::{SimulatedPredictor, SIMULATED_ACCURACY_PERCENT};

use crate::models::{Prediction, RetrainOutcome};
use crate::profile::PredictorConfig;
use anyhow::Result;
use async_trait::async_trait;

/// Trait for prediction implementations
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Estimate resource usage `config.predictive_window_secs()` ahead.
    /// Confidence must fall within 70..=100 percent.
    async fn predict(&self, config: &PredictorConfig) -> Result<Prediction>;

    /// Refresh the model. Safe to call repeatedly; returns
    /// [`RetrainOutcome::InProgress`] while an earlier refresh is running.
    async fn retrain(&self) -> Result<RetrainOutcome>;
}
