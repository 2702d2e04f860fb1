//! Transport fault classification.

use crate::error::{DeliveryError, ErrorKind};
use crate::transport::{FaultPhase, TransportFault};

/// Maps a raw transport fault to a classified delivery error.
///
/// Pure and deterministic; rules are evaluated top to bottom and the
/// first match wins. The TLS-versus-STARTTLS rules are a best-effort
/// heuristic: a TLS port answered with STARTTLS (or the reverse) cannot
/// be told apart from raw socket behavior with certainty, so
/// misclassification is expected in edge cases. Structured fields
/// (phase, timeout flag, status) are preferred; the fault text is only
/// consulted where the server left nothing better behind.
#[must_use]
pub fn classify(fault: &TransportFault) -> DeliveryError {
    let kind = classify_kind(fault);
    DeliveryError::new(kind, fault.detail.clone())
}

fn classify_kind(fault: &TransportFault) -> ErrorKind {
    // Resolution-phase faults, splitting "host not found" from the rest.
    if fault.phase == FaultPhase::Resolve {
        if mentions_host_not_found(&fault.detail) {
            return ErrorKind::Dns;
        }
        return ErrorKind::Network;
    }

    // A connection dropped mid-STARTTLS usually means the port wanted
    // something other than a STARTTLS handshake.
    if fault.phase == FaultPhase::StartTls && !fault.timed_out {
        return ErrorKind::StarttlsRequired;
    }

    // Socket failure after resolution succeeded, with no server reply.
    if !fault.timed_out
        && fault.status.is_none()
        && matches!(
            fault.phase,
            FaultPhase::Connect | FaultPhase::Greeting | FaultPhase::Data
        )
    {
        return ErrorKind::Network;
    }

    // Timing out before any greeting usually means the port expected an
    // implicit TLS handshake the client never offered.
    if fault.timed_out && matches!(fault.phase, FaultPhase::Connect | FaultPhase::Greeting) {
        return ErrorKind::TlsRequired;
    }

    if fault.timed_out {
        return ErrorKind::Timeout;
    }

    if fault.phase == FaultPhase::Auth {
        return ErrorKind::Auth;
    }

    // Envelope rejections: 4xx is server-side and transient, a 5xx that
    // talks about the recipient is a bad address.
    match fault.status {
        Some(status) if (400..500).contains(&status) => ErrorKind::Throttled,
        Some(status) if (500..600).contains(&status) && mentions_recipient(&fault.detail) => {
            ErrorKind::InvalidRecipient
        }
        _ => ErrorKind::Unknown,
    }
}

fn mentions_host_not_found(detail: &str) -> bool {
    let text = detail.to_lowercase();
    text.contains("not found")
        || text.contains("name or service not known")
        || text.contains("nodename")
        || text.contains("no such host")
        || text.contains("nxdomain")
}

fn mentions_recipient(detail: &str) -> bool {
    let text = detail.to_lowercase();
    text.contains("recipient")
        || text.contains("rcpt")
        || text.contains("mailbox")
        || text.contains("user unknown")
        || text.contains("address")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportFault;

    fn fault(phase: FaultPhase, detail: &str) -> TransportFault {
        TransportFault::new(phase, detail)
    }

    #[test]
    fn test_host_not_found_is_dns() {
        let err = classify(&fault(
            FaultPhase::Resolve,
            "failed to lookup address information: Name or service not known",
        ));
        assert_eq!(err.kind, ErrorKind::Dns);
    }

    #[test]
    fn test_other_resolution_fault_is_network() {
        let err = classify(&fault(FaultPhase::Resolve, "temporary failure in resolution"));
        assert_eq!(err.kind, ErrorKind::Network);
    }

    #[test]
    fn test_starttls_drop_is_starttls_required() {
        let err = classify(&fault(FaultPhase::StartTls, "connection reset by peer"));
        assert_eq!(err.kind, ErrorKind::StarttlsRequired);
    }

    #[test]
    fn test_socket_failure_after_resolution_is_network() {
        let err = classify(&fault(FaultPhase::Connect, "connection refused"));
        assert_eq!(err.kind, ErrorKind::Network);

        let err = classify(&fault(FaultPhase::Data, "broken pipe"));
        assert_eq!(err.kind, ErrorKind::Network);
    }

    #[test]
    fn test_connect_timeout_is_tls_required() {
        let err = classify(&TransportFault::timed_out(
            FaultPhase::Connect,
            "no greeting",
        ));
        assert_eq!(err.kind, ErrorKind::TlsRequired);

        let err = classify(&TransportFault::timed_out(
            FaultPhase::Greeting,
            "no greeting",
        ));
        assert_eq!(err.kind, ErrorKind::TlsRequired);
    }

    #[test]
    fn test_operation_timeout_is_timeout() {
        let err = classify(&TransportFault::timed_out(FaultPhase::Data, "read timed out"));
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_starttls_timeout_is_timeout_not_starttls() {
        let err = classify(&TransportFault::timed_out(
            FaultPhase::StartTls,
            "handshake timed out",
        ));
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_auth_phase_is_auth() {
        let err = classify(
            &fault(FaultPhase::Auth, "535 5.7.8 authentication credentials invalid")
                .with_status(535),
        );
        assert_eq!(err.kind, ErrorKind::Auth);
    }

    #[test]
    fn test_transient_reply_is_throttled() {
        let err = classify(
            &fault(FaultPhase::Envelope, "421 4.7.0 try again later").with_status(421),
        );
        assert_eq!(err.kind, ErrorKind::Throttled);
    }

    #[test]
    fn test_permanent_recipient_reply_is_invalid_recipient() {
        let err = classify(
            &fault(FaultPhase::Envelope, "550 5.1.1 user unknown").with_status(550),
        );
        assert_eq!(err.kind, ErrorKind::InvalidRecipient);
    }

    #[test]
    fn test_permanent_reply_without_recipient_text_is_unknown() {
        let err = classify(
            &fault(FaultPhase::Envelope, "554 5.3.0 transaction failed").with_status(554),
        );
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_unplaced_fault_is_unknown() {
        let err = classify(&fault(FaultPhase::Other, "unexpected response"));
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_details_are_preserved() {
        let err = classify(&fault(FaultPhase::Other, "raw transport text"));
        assert_eq!(err.details, "raw transport text");
    }
}
