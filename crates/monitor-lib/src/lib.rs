//! Core library for the devops health monitor
//!
//! This crate provides:
//! - Environment-selected configuration profiles
//! - Threshold-based health evaluation
//! - Capability traits for metric sources, predictors and event sinks
//! - The sampling/retraining scheduler
//! - Health tracking and observability

pub mod error;
pub mod evaluator;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod profile;
pub mod scheduler;
pub mod sink;
pub mod source;

pub use error::MonitorError;
pub use evaluator::{evaluate, exceeds_predictive_threshold};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
pub use profile::{ConfigProfile, PredictorConfig, ProfileName};
pub use scheduler::{LoopState, LoopSummary, MonitorHandle, MonitorLoop, MonitorLoopBuilder};
