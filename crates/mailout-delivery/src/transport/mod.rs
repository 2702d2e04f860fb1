//! Mail transport abstraction.
//!
//! The pipeline never speaks SMTP itself. It drives an opaque transport
//! that owns a pool of live server connections, and depends only on the
//! [`MailTransport`] trait so tests can inject scripted failure
//! sequences.

mod smtp;

pub use smtp::{LettreTransport, build_transport};

use async_trait::async_trait;
use mailout_core::EmailMessage;
use std::time::Duration;
use thiserror::Error;

/// Maximum simultaneous pooled connections per transport.
///
/// Excess concurrent sends wait for a free pooled connection; this cap is
/// the pipeline's only backpressure mechanism.
pub const MAX_POOL_CONNECTIONS: u32 = 10;

/// Time allowed for establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed for the server greeting after connecting.
pub const GREETING_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-operation socket timeout once a session is up.
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

/// Where in the exchange with the server a failure surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPhase {
    /// Hostname resolution.
    Resolve,
    /// TCP connect or implicit TLS handshake.
    Connect,
    /// STARTTLS upgrade negotiation.
    StartTls,
    /// Waiting for or reading the server greeting.
    Greeting,
    /// Credential exchange.
    Auth,
    /// MAIL FROM / RCPT TO exchange.
    Envelope,
    /// Message data transfer.
    Data,
    /// Anything the transport could not place.
    Other,
}

/// Structured failure reported by a transport implementation.
///
/// Phase, timeout flag and server status are the structured surface the
/// classifier keys on; `detail` keeps the raw text for diagnostics and as
/// a last-resort heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct TransportFault {
    /// Phase the failure surfaced in.
    pub phase: FaultPhase,
    /// Whether the operation timed out.
    pub timed_out: bool,
    /// SMTP reply status, when the server answered at all.
    pub status: Option<u16>,
    /// Raw failure text.
    pub detail: String,
}

impl TransportFault {
    /// Creates a fault for the given phase.
    #[must_use]
    pub fn new(phase: FaultPhase, detail: impl Into<String>) -> Self {
        Self {
            phase,
            timed_out: false,
            status: None,
            detail: detail.into(),
        }
    }

    /// Creates a timed-out fault for the given phase.
    #[must_use]
    pub fn timed_out(phase: FaultPhase, detail: impl Into<String>) -> Self {
        Self {
            phase,
            timed_out: true,
            status: None,
            detail: detail.into(),
        }
    }

    /// Attaches the server's reply status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Server response to a successful submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Recipients the server refused while still taking the message.
    pub rejected: Vec<String>,
}

impl SendReceipt {
    /// Receipt for a fully accepted submission.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            rejected: Vec::new(),
        }
    }

    /// Returns true if every recipient was accepted.
    #[must_use]
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A pooled connection to the outbound mail server.
///
/// Exclusively owned by one in-flight delivery attempt. Implementations
/// open connections lazily; construction does no network I/O.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submits one message and waits for the server's response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFault`] on any transport or protocol fault.
    /// Per-recipient refusals on an otherwise accepted submission are a
    /// [`SendReceipt`] with `rejected` entries, not an error.
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, TransportFault>;

    /// Performs one verify round trip (connect and authenticate, no mail).
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFault`] if the handshake fails.
    async fn verify(&self) -> Result<(), TransportFault>;

    /// Releases the pooled connections.
    ///
    /// In-flight operations on the transport fail once it is closed; the
    /// orchestrator treats those failures as teardown, not new faults.
    async fn close(&self);
}
