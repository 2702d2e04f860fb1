//! Delivery error taxonomy.

use thiserror::Error;

/// Classified kinds of delivery failure.
///
/// Callers present the kind (for example "authentication failed" or
/// "check your connection") rather than raw transport text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Server hostname could not be resolved.
    Dns,
    /// Socket-level failure reaching or talking to the server.
    Network,
    /// An operation timed out mid-session.
    Timeout,
    /// The server likely expects implicit TLS on this port.
    TlsRequired,
    /// The server likely expects STARTTLS on this port.
    StarttlsRequired,
    /// The server rejected the credentials.
    Auth,
    /// The server refused the envelope with a transient (4xx) reply.
    Throttled,
    /// The server permanently rejected the recipient.
    InvalidRecipient,
    /// Anything that matched no other kind.
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable name for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::TlsRequired => "tls_required",
            Self::StarttlsRequired => "starttls_required",
            Self::Auth => "auth",
            Self::Throttled => "throttled",
            Self::InvalidRecipient => "invalid_recipient",
            Self::Unknown => "unknown",
        }
    }

    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Dns => "Mail server not found",
            Self::Network => "Could not reach the mail server",
            Self::Timeout => "The mail server stopped responding",
            Self::TlsRequired => "This port expects an SSL/TLS connection",
            Self::StarttlsRequired => "This port expects a STARTTLS connection",
            Self::Auth => "Authentication failed",
            Self::Throttled => "The mail server is refusing messages right now",
            Self::InvalidRecipient => "The recipient address was rejected",
            Self::Unknown => "Sending failed",
        }
    }

    /// Returns true if retrying later may succeed without changing settings.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Throttled)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified delivery failure, produced once per fatal event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {details}", .kind.message())]
pub struct DeliveryError {
    /// Classified failure kind.
    pub kind: ErrorKind,
    /// Diagnostic text, never parsed by callers.
    pub details: String,
}

impl DeliveryError {
    /// Creates a new classified error.
    #[must_use]
    pub fn new(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_kind_message() {
        let err = DeliveryError::new(ErrorKind::Auth, "535 5.7.8 bad credentials");
        assert_eq!(
            err.to_string(),
            "Authentication failed: 535 5.7.8 bad credentials"
        );
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::Throttled.is_transient());
        assert!(ErrorKind::Timeout.is_transient());
        assert!(!ErrorKind::Auth.is_transient());
        assert!(!ErrorKind::InvalidRecipient.is_transient());
    }
}
