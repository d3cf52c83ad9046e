//! Threshold evaluation for snapshots and predictions

use crate::models::{HealthStatus, HealthVerdict, Prediction, ResourceSnapshot};

/// Classify a snapshot against a threshold
///
/// The comparison is strict: usage exactly at the threshold is healthy.
pub fn evaluate(snapshot: ResourceSnapshot, threshold_percent: f64) -> HealthVerdict {
    let max_usage = snapshot.max_usage();
    let status = if max_usage > threshold_percent {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    HealthVerdict {
        status,
        max_usage,
        snapshot,
    }
}

/// Whether a prediction warrants a predictive alert
pub fn exceeds_predictive_threshold(prediction: &Prediction, threshold_percent: f64) -> bool {
    prediction.predicted_cpu > threshold_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ConfigProfile;

    fn prediction_with_cpu(cpu: f64) -> Prediction {
        Prediction {
            horizon_secs: 300,
            predicted_cpu: cpu,
            predicted_mem: 20.0,
            predicted_traffic: 500.0,
            confidence_percent: 85.0,
        }
    }

    #[test]
    fn test_development_scenario_warning() {
        let profile = ConfigProfile::development();
        let snapshot = ResourceSnapshot::new(95.0, 40.0, 10.0);

        let verdict = evaluate(snapshot, profile.alert_threshold_percent());

        assert_eq!(verdict.status, HealthStatus::Warning);
        assert_eq!(verdict.max_usage, 95.0);
        assert_eq!(verdict.snapshot, snapshot);
    }

    #[test]
    fn test_production_scenario_healthy() {
        let profile = ConfigProfile::production();
        let snapshot = ResourceSnapshot::new(50.0, 60.0, 70.0);

        let verdict = evaluate(snapshot, profile.alert_threshold_percent());

        assert_eq!(verdict.status, HealthStatus::Healthy);
        assert_eq!(verdict.max_usage, 70.0);
    }

    #[test]
    fn test_threshold_boundary_is_healthy() {
        for (cpu, mem, disk) in [(80.0, 0.0, 0.0), (0.0, 80.0, 0.0), (0.0, 0.0, 80.0)] {
            let verdict = evaluate(ResourceSnapshot::new(cpu, mem, disk), 80.0);
            assert_eq!(verdict.status, HealthStatus::Healthy);
            assert_eq!(verdict.max_usage, 80.0);
        }
    }

    #[test]
    fn test_any_metric_above_threshold_warns() {
        let threshold = 75.0;
        let cases = [
            (75.01, 0.0, 0.0),
            (0.0, 99.0, 0.0),
            (10.0, 10.0, 100.0),
        ];

        for (cpu, mem, disk) in cases {
            let verdict = evaluate(ResourceSnapshot::new(cpu, mem, disk), threshold);
            assert_eq!(verdict.status, HealthStatus::Warning, "{cpu}/{mem}/{disk}");
        }
    }

    #[test]
    fn test_threshold_rule_over_grid() {
        let threshold = 50.0;
        let mut value = 0.0;
        while value <= 100.0 {
            let verdict = evaluate(ResourceSnapshot::new(value, value / 2.0, 0.0), threshold);
            let expected = if value > threshold {
                HealthStatus::Warning
            } else {
                HealthStatus::Healthy
            };
            assert_eq!(verdict.status, expected, "max usage {value}");
            value += 2.5;
        }
    }

    #[test]
    fn test_predictive_threshold_is_strict() {
        let threshold = ConfigProfile::experimental().alert_threshold_percent();

        assert!(exceeds_predictive_threshold(&prediction_with_cpu(78.0), threshold));
        assert!(!exceeds_predictive_threshold(&prediction_with_cpu(75.0), threshold));
        assert!(!exceeds_predictive_threshold(&prediction_with_cpu(12.0), threshold));
    }
}
