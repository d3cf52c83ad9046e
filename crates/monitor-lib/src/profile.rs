//! Configuration profiles
//!
//! A profile is selected once at startup from an environment selector and
//! never changes afterwards. Unknown or missing selectors fall back to
//! production.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the profile selector
pub const PROFILE_ENV_VAR: &str = "NODE_ENV";

/// Debug port advertised while debug mode is active
pub const DEBUG_PORT: u16 = 9229;

/// Name of a built-in profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    Production,
    Development,
    Experimental,
}

impl ProfileName {
    /// Map a selector to a profile name. Never fails.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("development") => ProfileName::Development,
            Some("experimental") => ProfileName::Experimental,
            _ => ProfileName::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Production => "production",
            ProfileName::Development => "development",
            ProfileName::Experimental => "experimental",
        }
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the predictive extension
///
/// The model path and metrics endpoint are passed through to the predictor
/// untouched; the core never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorConfig {
    model_path: PathBuf,
    metrics_endpoint: String,
    cloud_providers: BTreeSet<String>,
    predictive_window_secs: u64,
    retrain_interval: Duration,
}

impl PredictorConfig {
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn metrics_endpoint(&self) -> &str {
        &self.metrics_endpoint
    }

    /// Cloud providers, in stable (sorted) order
    pub fn cloud_providers(&self) -> impl Iterator<Item = &str> {
        self.cloud_providers.iter().map(String::as_str)
    }

    /// How far ahead predictions look, always > 0
    pub fn predictive_window_secs(&self) -> u64 {
        self.predictive_window_secs
    }

    pub fn retrain_interval(&self) -> Duration {
        self.retrain_interval
    }
}

/// Immutable monitoring parameters for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigProfile {
    name: ProfileName,
    sample_interval: Duration,
    alert_threshold_percent: f64,
    debug_mode: bool,
    verbose_logging: bool,
    ai_enabled: bool,
    predictor: Option<PredictorConfig>,
}

impl ConfigProfile {
    /// Resolve a selector to one of the built-in profiles
    pub fn resolve(selector: Option<&str>) -> Self {
        Self::named(ProfileName::from_selector(selector))
    }

    /// Resolve the profile from the `NODE_ENV` environment variable
    pub fn from_env() -> Self {
        let selector = std::env::var(PROFILE_ENV_VAR).ok();
        Self::resolve(selector.as_deref())
    }

    pub fn named(name: ProfileName) -> Self {
        match name {
            ProfileName::Production => Self::production(),
            ProfileName::Development => Self::development(),
            ProfileName::Experimental => Self::experimental(),
        }
    }

    pub fn production() -> Self {
        Self {
            name: ProfileName::Production,
            sample_interval: Duration::from_millis(60_000),
            alert_threshold_percent: 80.0,
            debug_mode: false,
            verbose_logging: false,
            ai_enabled: false,
            predictor: None,
        }
    }

    pub fn development() -> Self {
        Self {
            name: ProfileName::Development,
            sample_interval: Duration::from_millis(5_000),
            alert_threshold_percent: 90.0,
            debug_mode: true,
            verbose_logging: true,
            ai_enabled: false,
            predictor: None,
        }
    }

    pub fn experimental() -> Self {
        Self {
            name: ProfileName::Experimental,
            sample_interval: Duration::from_millis(30_000),
            alert_threshold_percent: 75.0,
            debug_mode: false,
            verbose_logging: false,
            ai_enabled: true,
            predictor: Some(PredictorConfig {
                model_path: PathBuf::from("./models/anomaly-detection.h5"),
                metrics_endpoint: "http://localhost:9000/metrics".to_string(),
                cloud_providers: ["aws", "azure", "gcp"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                predictive_window_secs: 300,
                retrain_interval: Duration::from_millis(120_000),
            }),
        }
    }

    pub fn name(&self) -> ProfileName {
        self.name
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub fn alert_threshold_percent(&self) -> f64 {
        self.alert_threshold_percent
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn verbose_logging(&self) -> bool {
        self.verbose_logging
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    /// Predictor settings, present only when AI mode is enabled
    pub fn predictor(&self) -> Option<&PredictorConfig> {
        if self.ai_enabled {
            self.predictor.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_selectors() {
        assert_eq!(
            ConfigProfile::resolve(Some("production")).name(),
            ProfileName::Production
        );
        assert_eq!(
            ConfigProfile::resolve(Some("development")).name(),
            ProfileName::Development
        );
        assert_eq!(
            ConfigProfile::resolve(Some("experimental")).name(),
            ProfileName::Experimental
        );
    }

    #[test]
    fn test_resolve_is_total() {
        let inputs = [
            None,
            Some(""),
            Some("staging"),
            Some("Production"),
            Some("DEVELOPMENT"),
            Some(" experimental"),
            Some("experimental\n"),
            Some("\u{1F600}"),
        ];

        for input in inputs {
            assert_eq!(
                ConfigProfile::resolve(input).name(),
                ProfileName::Production,
                "selector {:?} should fall back to production",
                input
            );
        }
    }

    #[test]
    fn test_production_literals() {
        let profile = ConfigProfile::production();
        assert_eq!(profile.sample_interval(), Duration::from_millis(60_000));
        assert_eq!(profile.alert_threshold_percent(), 80.0);
        assert!(!profile.debug_mode());
        assert!(!profile.verbose_logging());
        assert!(!profile.ai_enabled());
        assert!(profile.predictor().is_none());
    }

    #[test]
    fn test_development_literals() {
        let profile = ConfigProfile::development();
        assert_eq!(profile.sample_interval(), Duration::from_millis(5_000));
        assert_eq!(profile.alert_threshold_percent(), 90.0);
        assert!(profile.debug_mode());
        assert!(profile.verbose_logging());
        assert!(!profile.ai_enabled());
        assert!(profile.predictor().is_none());
    }

    #[test]
    fn test_experimental_literals() {
        let profile = ConfigProfile::experimental();
        assert_eq!(profile.sample_interval(), Duration::from_millis(30_000));
        assert_eq!(profile.alert_threshold_percent(), 75.0);
        assert!(!profile.debug_mode());
        assert!(profile.ai_enabled());

        let predictor = profile.predictor().unwrap();
        assert_eq!(predictor.predictive_window_secs(), 300);
        assert_eq!(predictor.retrain_interval(), Duration::from_millis(120_000));
        assert_eq!(
            predictor.cloud_providers().collect::<Vec<_>>(),
            vec!["aws", "azure", "gcp"]
        );
        assert_eq!(predictor.metrics_endpoint(), "http://localhost:9000/metrics");
        assert_eq!(
            predictor.model_path(),
            Path::new("./models/anomaly-detection.h5")
        );
    }

    #[test]
    fn test_profile_name_display() {
        assert_eq!(ProfileName::Experimental.to_string(), "experimental");
        assert_eq!(
            serde_json::to_string(&ProfileName::Development).unwrap(),
            "\"development\""
        );
    }
}
