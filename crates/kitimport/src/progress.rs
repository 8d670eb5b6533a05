//! Progress tracking for import runs
//!
//! The percentage is `floor(100 * processed / total)` and is reported after
//! every entry. Runs with no entries never report.

use kitimport_types::ProgressSink;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Counts processed entries against a fixed total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    processed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    /// Mark one more entry as processed and return the new percentage
    ///
    /// Returns `None` when there is nothing to track.
    pub fn advance(&mut self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        self.processed = (self.processed + 1).min(self.total);
        Some(self.percent())
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // processed <= total keeps this within 0..=100
        ((100 * self.processed) / self.total) as u8
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// A broadcast progress update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub message: Option<String>,
    pub channel: String,
}

/// Writes progress to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn emit(&self, percent: u8, message: Option<&str>, channel: &str) {
        info!(percent, channel, message = message.unwrap_or(""), "Import progress");
    }
}

/// Forwards progress events to an unbounded channel
///
/// Sends never block; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, percent: u8, message: Option<&str>, channel: &str) {
        let _ = self.sender.send(ProgressEvent {
            percent,
            message: message.map(str::to_string),
            channel: channel.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_percent_is_floored() {
        let mut tracker = ProgressTracker::new(3);

        assert_eq!(tracker.advance(), Some(33));
        assert_eq!(tracker.advance(), Some(66));
        assert_eq!(tracker.advance(), Some(100));
        assert_eq!(tracker.processed(), 3);
    }

    #[test]
    fn test_never_exceeds_total() {
        let mut tracker = ProgressTracker::new(1);
        tracker.advance();

        assert_eq!(tracker.advance(), Some(100));
        assert_eq!(tracker.processed(), tracker.total());
    }

    #[test]
    fn test_zero_total_reports_nothing() {
        let mut tracker = ProgressTracker::new(0);

        assert_eq!(tracker.advance(), None);
        assert_eq!(tracker.percent(), 0);
        assert_eq!(tracker.processed(), 0);
    }

    #[test]
    fn test_sequence_is_non_decreasing() {
        let mut tracker = ProgressTracker::new(7);
        let percents: Vec<u8> = (0..7).filter_map(|_| tracker.advance()).collect();

        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelProgressSink::new(tx);

        sink.emit(50, None, "eventLog");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.percent, 50);
        assert_eq!(event.channel, "eventLog");
        assert!(event.message.is_none());
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        ChannelProgressSink::new(tx).emit(10, Some("still fine"), "eventLog");
    }
}
