//! Channel-backed sink for in-process consumers

use super::{MonitorEvent, Sink};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Forwards events into a bounded channel
///
/// The channel itself serializes concurrent senders. Emission waits for
/// capacity, so a slow consumer applies back-pressure to the emitting
/// activity only.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<MonitorEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver for its events
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn emit(&self, event: &MonitorEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .await
            .map_err(|_| anyhow!("event receiver dropped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RetrainReport;

    fn retrain_event(round: u64) -> MonitorEvent {
        MonitorEvent::RetrainReport(RetrainReport {
            accuracy_percent: 94.7,
            round,
        })
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut rx) = ChannelSink::new(8);

        for round in 1..=3 {
            sink.emit(&retrain_event(round)).await.unwrap();
        }

        for round in 1..=3 {
            assert_eq!(rx.recv().await.unwrap(), retrain_event(round));
        }
    }

    #[tokio::test]
    async fn test_emit_fails_after_receiver_dropped() {
        let (sink, rx) = ChannelSink::new(8);
        drop(rx);

        tokio_test::assert_err!(sink.emit(&retrain_event(1)).await);
    }
}
