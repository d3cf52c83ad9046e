//! DevOps Monitor - simulated infrastructure health monitor
//!
//! Resolves a profile from the environment, then samples resource usage on
//! the profile's cadence and reports verdicts to the console. In AI mode it
//! also reports cloud status, predictions, and periodic retrain results.

use anyhow::Result;
use monitor_lib::{
    health::components,
    predictor::{Predictor, SimulatedPredictor},
    sink::ConsoleSink,
    source::SimulatedSource,
    ConfigProfile, HealthRegistry, MonitorLoop, MonitorMetrics, StructuredLogger,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long shutdown waits for an in-flight tick before abandoning it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings and resolve the profile before logging so its verbosity applies
    let settings = config::MonitorSettings::load()?;
    let profile = ConfigProfile::resolve(settings.environment.as_deref());

    init_tracing(&profile, settings.log_json);

    let logger = StructuredLogger::new(profile.name().as_str());
    logger.log_startup(MONITOR_VERSION, &profile);

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SOURCE).await;
    health_registry.register(components::SINK).await;

    // Register metrics before anything can be scraped
    let _metrics = MonitorMetrics::new();

    let mut builder = MonitorLoop::builder()
        .profile(profile.clone())
        .source(Arc::new(SimulatedSource::new()))
        .sink(Arc::new(ConsoleSink::stdout(settings.output)))
        .health_registry(health_registry.clone());

    if let Some(config) = profile.predictor() {
        let predictor: Arc<dyn Predictor> = Arc::new(SimulatedPredictor::load(config)?);
        health_registry.register(components::PREDICTOR).await;
        logger.log_model_loaded(
            &config.model_path().display().to_string(),
            config.predictive_window_secs(),
        );
        builder = builder.predictor(predictor);
    }

    let handle = builder.build()?.start();

    // Start health and metrics server when a port is configured
    let api_handle = settings.api_port.map(|port| {
        let app_state = Arc::new(api::AppState::new(
            health_registry.clone(),
            handle.subscribe_state(),
        ));
        api::spawn(port, app_state)
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");

    let summary = handle.stop_within(SHUTDOWN_GRACE).await;
    for activity in &summary.abandoned {
        logger.log_abandoned(*activity);
    }
    info!(
        sampling_ticks = summary.sampling_ticks,
        retrain_rounds = summary.retrain_rounds,
        retrain_failures = summary.retrain_failures,
        retrain_skipped = summary.retrain_skipped,
        "Shutdown complete"
    );

    if let Some(api_handle) = api_handle {
        api_handle.abort();
    }

    Ok(())
}

/// Logs go to stderr so they never interleave with console events on stdout.
/// `RUST_LOG` wins; otherwise the profile's verbosity picks the level.
fn init_tracing(profile: &ConfigProfile, json: bool) {
    let default_level = if profile.verbose_logging() {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
