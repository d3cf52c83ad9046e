//! Console sink
//!
//! Renders each event as one block of text (or one JSON line) and writes
//! the whole block while holding a lock, so output from the two activities
//! is never interleaved mid-block.

use super::{MonitorEvent, Sink};
use crate::models::HealthStatus;
use crate::profile::DEBUG_PORT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// How events are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Human-readable console blocks (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Sink writing rendered events to an async writer
pub struct ConsoleSink<W = Stdout> {
    writer: Mutex<W>,
    format: RenderFormat,
}

impl ConsoleSink<Stdout> {
    /// Sink writing to standard output
    pub fn stdout(format: RenderFormat) -> Self {
        Self::new(tokio::io::stdout(), format)
    }
}

impl<W> ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, format: RenderFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    pub fn format(&self) -> RenderFormat {
        self.format
    }

    /// Consume the sink and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn render(&self, event: &MonitorEvent) -> Result<String> {
        match self.format {
            RenderFormat::Text => Ok(render_text(event)),
            RenderFormat::Json => {
                let mut line =
                    serde_json::to_string(event).context("Failed to serialize event")?;
                line.push('\n');
                Ok(line)
            }
        }
    }
}

#[async_trait]
impl<W> Sink for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn emit(&self, event: &MonitorEvent) -> Result<()> {
        let block = self.render(event)?;

        let mut writer = self.writer.lock().await;
        writer
            .write_all(block.as_bytes())
            .await
            .context("Failed to write event")?;
        writer.flush().await.context("Failed to flush event")?;
        Ok(())
    }
}

/// Render an event as a human-readable block, newline terminated
pub fn render_text(event: &MonitorEvent) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = match event {
        MonitorEvent::CloudStatusReport(report) => writeln!(
            out,
            "☁️  {} Cloud:\n   ✓ Instances: {}\n   ✓ Load: {:.2}%\n   ✓ Health: {}",
            report.provider.to_uppercase(),
            report.instances,
            report.load,
            if report.healthy { "HEALTHY" } else { "DEGRADED" }
        ),
        MonitorEvent::HealthReport(report) => {
            let _ = writeln!(
                out,
                "\n[{}] Checking system health...\n   CPU: {:.2}%\n   Memory: {:.2}%\n   Disk: {:.2}% used",
                report.timestamp.to_rfc3339(),
                report.cpu,
                report.mem,
                report.disk
            );
            let _ = match report.status {
                HealthStatus::Warning => {
                    writeln!(out, "🔴 System Status: WARNING - High resource usage")
                }
                HealthStatus::Healthy => writeln!(out, "🟢 System Status: HEALTHY"),
            };
            if report.debug_flags_active {
                let _ = writeln!(
                    out,
                    "Debug Mode: ACTIVE\n✓ Hot reload: Active\n✓ Debug port: {}",
                    DEBUG_PORT
                );
            }
            if report.ai_analysis {
                writeln!(
                    out,
                    "\n🤖 AI Analysis:\n   ✓ Pattern recognition: ACTIVE\n   ✓ Anomaly detection: NO ANOMALIES\n   ✓ Optimization suggestions: 12"
                )
            } else {
                Ok(())
            }
        }
        MonitorEvent::PredictionReport(report) => writeln!(
            out,
            "\n🤖 AI Prediction Engine: Analyzing trends...\n📊 Predicted metrics in {}s:\n   CPU: {:.2}% (confidence: {:.2}%)\n   Memory: {:.2}% (confidence: {:.2}%)\n   Traffic: {:.0} req/s",
            report.horizon_secs,
            report.predicted_cpu,
            report.confidence,
            report.predicted_mem,
            report.confidence,
            report.predicted_traffic
        ),
        MonitorEvent::PredictiveAlert(alert) => writeln!(
            out,
            "⚠️  Predictive Alert: High CPU expected ({:.2}% > {}%), initiating auto-scaling.",
            alert.predicted_cpu, alert.threshold
        ),
        MonitorEvent::RetrainReport(report) => writeln!(
            out,
            "\n🎓 Retraining AI model with new data...\n   Accuracy: {:.1}%\n   Model updated successfully (round {}).",
            report.accuracy_percent, report.round
        ),
        MonitorEvent::Degraded(report) => writeln!(
            out,
            "❗ [{}] {} degraded during {}: {}",
            report.timestamp.to_rfc3339(),
            report.component,
            report.activity,
            report.error
        ),
    };

    out
}
