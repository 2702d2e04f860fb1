//! Outgoing message model.

use serde::{Deserialize, Serialize};

/// Caller-assigned identifier for a message, unique within a batch.
///
/// Delivery outcomes are correlated back to the submitted message through
/// this key; the pipeline never needs the message content after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Create a new message ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A personalized email, immutable once submitted to a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Batch-unique identifier assigned by the caller.
    pub id: MessageId,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Optional Reply-To address.
    pub reply_to: Option<String>,
}

impl EmailMessage {
    /// Creates a new message.
    #[must_use]
    pub fn new(
        id: MessageId,
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            reply_to: None,
        }
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }
}
