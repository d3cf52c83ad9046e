//! Error taxonomy for the monitor core

use thiserror::Error;

/// Errors surfaced by the monitor core
///
/// Capability failures are isolated to the tick that produced them; none of
/// these variants stop a running loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The metrics source could not produce a snapshot or cloud status
    #[error("metrics source unavailable: {0}")]
    SourceUnavailable(String),

    /// The predictor failed to predict or retrain
    #[error("predictor failure: {0}")]
    PredictorFailure(String),

    /// An event could not be delivered to the sink
    #[error("sink write failure: {0}")]
    SinkWriteFailure(String),

    /// The predictor metrics endpoint is not a valid URL
    #[error("invalid metrics endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The loop was assembled with missing or inconsistent parts
    #[error("monitor misconfigured: {0}")]
    Misconfigured(String),
}

impl MonitorError {
    /// Wrap a metrics source error, keeping the full context chain
    pub fn source_unavailable(err: &anyhow::Error) -> Self {
        Self::SourceUnavailable(format!("{:#}", err))
    }

    /// Wrap a predictor error, keeping the full context chain
    pub fn predictor_failure(err: &anyhow::Error) -> Self {
        Self::PredictorFailure(format!("{:#}", err))
    }

    /// Wrap a sink error, keeping the full context chain
    pub fn sink_write_failure(err: &anyhow::Error) -> Self {
        Self::SinkWriteFailure(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_source_unavailable_keeps_context() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("permission denied"));
        let err = err.context("reading /proc/stat").unwrap_err();

        let wrapped = MonitorError::source_unavailable(&err);
        let message = wrapped.to_string();

        assert!(message.starts_with("metrics source unavailable"));
        assert!(message.contains("reading /proc/stat"));
        assert!(message.contains("permission denied"));
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = MonitorError::InvalidEndpoint {
            endpoint: "not a url".to_string(),
            source,
        };

        assert!(err.to_string().contains("\"not a url\""));
    }
}
