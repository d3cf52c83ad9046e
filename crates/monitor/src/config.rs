//! Process settings
//!
//! Only selects the profile and wires outputs; every monitoring parameter
//! comes from the selected profile.

use anyhow::Result;
use monitor_lib::sink::RenderFormat;
use serde::Deserialize;

/// Settings read from `MONITOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Profile selector (`MONITOR_ENVIRONMENT`, falling back to `NODE_ENV`)
    #[serde(default = "default_environment")]
    pub environment: Option<String>,

    /// Port for the health/metrics endpoint; disabled when unset
    #[serde(default)]
    pub api_port: Option<u16>,

    /// Console rendering of monitor events
    #[serde(default)]
    pub output: RenderFormat,

    /// Emit logs as JSON instead of plain text
    #[serde(default)]
    pub log_json: bool,
}

fn default_environment() -> Option<String> {
    std::env::var(monitor_lib::profile::PROFILE_ENV_VAR).ok()
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            api_port: None,
            output: RenderFormat::default(),
            log_json: false,
        }
    }
}

impl MonitorSettings {
    /// Load settings from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("MONITOR").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder().add_source(source).build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_source(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("MONITOR")
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn test_settings_from_environment() {
        let settings = MonitorSettings::from_source(env_source(&[
            ("MONITOR_ENVIRONMENT", "experimental"),
            ("MONITOR_API_PORT", "9100"),
            ("MONITOR_OUTPUT", "json"),
            ("MONITOR_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(settings.environment.as_deref(), Some("experimental"));
        assert_eq!(settings.api_port, Some(9100));
        assert_eq!(settings.output, RenderFormat::Json);
        assert!(settings.log_json);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = MonitorSettings::from_source(env_source(&[])).unwrap();

        assert_eq!(settings.api_port, None);
        assert_eq!(settings.output, RenderFormat::Text);
        assert!(!settings.log_json);
    }

    #[test]
    fn test_invalid_output_is_rejected() {
        let result = MonitorSettings::from_source(env_source(&[("MONITOR_OUTPUT", "yaml")]));
        assert!(result.is_err());
    }
}
