//! Per-message outcome reporting.

use mailout_core::MessageId;
use tokio::sync::mpsc;

/// Outcome of one message submission, pushed to the caller as soon as the
/// server's response for that message is known.
///
/// `accepted = false` is a soft failure: the submission itself succeeded
/// but the server refused the recipient. It never aborts the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// The message this outcome belongs to.
    pub message_id: MessageId,
    /// Whether the server accepted the recipient.
    pub accepted: bool,
}

/// Push-style sink for delivery outcomes.
///
/// Invoked at most once per message. After a fatal abort the remaining
/// unsent messages never produce an outcome, so callers must tolerate
/// receiving fewer outcomes than messages submitted.
pub trait OutcomeSink {
    /// Receive one outcome.
    fn report(&self, outcome: DeliveryOutcome);
}

impl OutcomeSink for mpsc::UnboundedSender<DeliveryOutcome> {
    fn report(&self, outcome: DeliveryOutcome) {
        if self.send(outcome).is_err() {
            tracing::debug!(id = %outcome.message_id, "outcome receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = DeliveryOutcome {
            message_id: MessageId::new(3),
            accepted: true,
        };
        tx.report(outcome);
        assert_eq!(rx.try_recv().ok(), Some(outcome));
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.report(DeliveryOutcome {
            message_id: MessageId::new(4),
            accepted: false,
        });
    }
}
