//! Pooled SMTP transport backed by lettre.

use super::{
    CONNECT_TIMEOUT, FaultPhase, GREETING_TIMEOUT, MAX_POOL_CONNECTIONS, MailTransport,
    SOCKET_TIMEOUT, SendReceipt, TransportFault,
};
use crate::error::{DeliveryError, ErrorKind};
use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mailout_core::{ConnectionSettings, EmailMessage, Security};
use std::sync::atomic::{AtomicBool, Ordering};

/// SMTP reply codes for a rejected credential exchange.
const AUTH_REPLY_CODES: [u16; 4] = [530, 534, 535, 538];

/// Builds a pooled transport from connection settings.
///
/// Pure construction: no network I/O happens until the first send or
/// verify. Network problems therefore surface later, through
/// [`TransportFault`]s, where they are classified in one place. The two
/// exceptions are local policy decisions, not network outcomes: plaintext
/// configurations are refused outright, and a host name lettre cannot
/// accept fails immediately.
///
/// # Errors
///
/// Returns a [`DeliveryError`] for a plaintext security mode or an
/// unusable host name.
pub fn build_transport(settings: &ConnectionSettings) -> Result<LettreTransport, DeliveryError> {
    let builder = match settings.security {
        Security::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
        Security::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host),
        Security::None => {
            return Err(DeliveryError::new(
                ErrorKind::TlsRequired,
                "plaintext connections are not supported; use TLS or STARTTLS",
            ));
        }
    }
    .map_err(|e| DeliveryError::new(ErrorKind::Unknown, e.to_string()))?;

    let transport = builder
        .port(settings.port)
        .credentials(Credentials::new(
            settings.username.clone(),
            settings.password.clone(),
        ))
        .timeout(Some(SOCKET_TIMEOUT))
        .pool_config(PoolConfig::new().max_size(MAX_POOL_CONNECTIONS))
        .build::<Tokio1Executor>();

    tracing::debug!(
        host = %settings.host,
        port = settings.port,
        security = settings.security.display_name(),
        "transport built"
    );

    Ok(LettreTransport {
        transport,
        security: settings.security,
        ever_connected: AtomicBool::new(false),
    })
}

/// [`MailTransport`] over lettre's pooled async SMTP transport.
#[derive(Debug)]
pub struct LettreTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    security: Security,
    /// Set after the first successful exchange with the server. Used to
    /// tell a connect-phase timeout (no greeting ever seen) apart from an
    /// operation timeout on an established session.
    ever_connected: AtomicBool,
}

impl LettreTransport {
    fn fault_from_error(&self, err: &lettre::transport::smtp::Error) -> TransportFault {
        let detail = err.to_string();

        // Reply-bearing failures: the server answered, keep its status.
        if let Some(code) = err.status() {
            let status = code.to_string().parse::<u16>().ok();
            let phase = match status {
                Some(s) if AUTH_REPLY_CODES.contains(&s) => FaultPhase::Auth,
                _ => FaultPhase::Envelope,
            };
            let mut fault = TransportFault::new(phase, detail);
            fault.status = status;
            return fault;
        }

        if err.is_timeout() {
            let phase = if self.ever_connected.load(Ordering::Relaxed) {
                FaultPhase::Data
            } else {
                FaultPhase::Connect
            };
            return TransportFault::timed_out(phase, detail);
        }

        if err.is_tls() {
            let phase = match self.security {
                Security::StartTls => FaultPhase::StartTls,
                Security::Tls | Security::None => FaultPhase::Connect,
            };
            return TransportFault::new(phase, detail);
        }

        if let Some(io) = io_source(err) {
            if is_resolution_failure(io) {
                return TransportFault::new(FaultPhase::Resolve, detail);
            }
            if io.kind() == std::io::ErrorKind::TimedOut {
                return TransportFault::timed_out(FaultPhase::Connect, detail);
            }
            // A connection dropped mid-upgrade before anything else
            // succeeded is the classic sign of STARTTLS against a port
            // that wanted something else.
            let phase = if self.security == Security::StartTls
                && !self.ever_connected.load(Ordering::Relaxed)
                && is_abrupt_close(io)
            {
                FaultPhase::StartTls
            } else {
                FaultPhase::Connect
            };
            return TransportFault::new(phase, detail);
        }

        TransportFault::new(FaultPhase::Other, detail)
    }
}

#[async_trait]
impl MailTransport for LettreTransport {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, TransportFault> {
        let mail = build_mail(message)?;

        match self.transport.send(mail).await {
            Ok(response) => {
                self.ever_connected.store(true, Ordering::Relaxed);
                tracing::debug!(id = %message.id, code = %response.code(), "message submitted");
                // lettre surfaces refused recipients as errors rather
                // than partial receipts, so a successful send accepted
                // the whole envelope.
                Ok(SendReceipt::accepted())
            }
            Err(e) => Err(self.fault_from_error(&e)),
        }
    }

    async fn verify(&self) -> Result<(), TransportFault> {
        let deadline = CONNECT_TIMEOUT + GREETING_TIMEOUT;
        match tokio::time::timeout(deadline, self.transport.test_connection()).await {
            Ok(Ok(true)) => {
                self.ever_connected.store(true, Ordering::Relaxed);
                Ok(())
            }
            Ok(Ok(false)) => Err(TransportFault::new(
                FaultPhase::Greeting,
                "server rejected the verification handshake",
            )),
            Ok(Err(e)) => Err(self.fault_from_error(&e)),
            Err(_) => Err(TransportFault::timed_out(
                FaultPhase::Connect,
                "no server greeting before the verification deadline",
            )),
        }
    }

    async fn close(&self) {
        // lettre's pool tears its connections down when the transport is
        // dropped; the orchestrator drops this value right after close.
        tracing::debug!("transport closed");
    }
}

/// Renders an [`EmailMessage`] into a lettre message.
fn build_mail(message: &EmailMessage) -> Result<Message, TransportFault> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| invalid_address("from", &e))?;
    let to: Mailbox = message.to.parse().map_err(|e| invalid_address("to", &e))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone());

    if let Some(reply_to) = &message.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .map_err(|e| invalid_address("reply_to", &e))?;
        builder = builder.reply_to(reply_to);
    }

    builder
        .singlepart(SinglePart::html(message.html_body.clone()))
        .map_err(|e| TransportFault::new(FaultPhase::Other, e.to_string()))
}

fn invalid_address(field: &str, err: &lettre::address::AddressError) -> TransportFault {
    TransportFault::new(FaultPhase::Envelope, format!("invalid {field} address: {err}"))
}

/// Walks the source chain looking for the underlying I/O error.
fn io_source<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a std::io::Error> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io);
        }
        source = cause.source();
    }
    None
}

fn is_resolution_failure(io: &std::io::Error) -> bool {
    let text = io.to_string().to_lowercase();
    text.contains("lookup")
        || text.contains("name or service not known")
        || text.contains("nodename")
        || text.contains("no such host")
}

fn is_abrupt_close(io: &std::io::Error) -> bool {
    matches!(
        io.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailout_core::MessageId;

    fn settings(security: Security) -> ConnectionSettings {
        ConnectionSettings {
            host: "smtp.example.com".to_string(),
            port: ConnectionSettings::default_port(security),
            security,
            username: "author@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_build_transport_rejects_plaintext() {
        let err = build_transport(&settings(Security::None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TlsRequired);
    }

    #[tokio::test]
    async fn test_build_transport_is_pure_construction() {
        assert!(build_transport(&settings(Security::Tls)).is_ok());
        assert!(build_transport(&settings(Security::StartTls)).is_ok());
    }

    #[test]
    fn test_build_mail_with_reply_to() {
        let message = EmailMessage::new(
            MessageId::new(1),
            "Author <author@example.com>",
            "reader@example.com",
            "Hello",
            "<p>Hi</p>",
        )
        .reply_to("replies@example.com");

        assert!(build_mail(&message).is_ok());
    }

    #[test]
    fn test_build_mail_flags_bad_recipient() {
        let message = EmailMessage::new(
            MessageId::new(2),
            "author@example.com",
            "not an address",
            "Hello",
            "<p>Hi</p>",
        );

        let fault = build_mail(&message).unwrap_err();
        assert_eq!(fault.phase, FaultPhase::Envelope);
        assert!(fault.detail.contains("to"));
    }

    #[test]
    fn test_resolution_failure_text() {
        let io = std::io::Error::other("failed to lookup address information: Name or service not known");
        assert!(is_resolution_failure(&io));

        let io = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert!(!is_resolution_failure(&io));
    }
}
