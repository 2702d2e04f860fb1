//! # mailout-delivery
//!
//! Bulk email delivery over a pooled SMTP transport.
//!
//! Given a batch of personalized messages and one set of server
//! settings, the pipeline submits every message, streams per-message
//! outcomes back to the caller and reduces any fatal fault to a closed
//! taxonomy of classified errors.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailout_core::{ConnectionSettings, EmailMessage, MessageId};
//! use mailout_delivery::{DeliveryOutcome, probe_settings, send_batch};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailout_delivery::DeliveryError> {
//!     let settings = ConnectionSettings::for_address("author@gmail.com");
//!
//!     // Confirm the server is reachable and the credentials work.
//!     probe_settings(&settings, true).await?;
//!
//!     let messages = vec![
//!         EmailMessage::new(
//!             MessageId::new(1),
//!             "author@gmail.com",
//!             "reader@example.com",
//!             "Issue #12",
//!             "<p>Hello!</p>",
//!         ),
//!     ];
//!
//!     let (tx, mut rx) = mpsc::unbounded_channel::<DeliveryOutcome>();
//!     send_batch(&settings, messages, &tx).await?;
//!
//!     while let Some(outcome) = rx.recv().await {
//!         println!("{}: accepted={}", outcome.message_id, outcome.accepted);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery phases
//!
//! ```text
//! ┌─────────────────┐   first fault    ┌───────────────────┐
//! │ ParallelSubmit  │ ───────────────→ │  SequentialRetry  │
//! │ (shared pool)   │  close + rebuild │  (fresh transport,│
//! └─────────────────┘                  │   one retry each) │
//!          │                           └───────────────────┘
//!          │ all accepted                   │          │
//!          ▼                                ▼          ▼
//!       success                         success   classified abort
//! ```
//!
//! ## Modules
//!
//! - [`batch`]: the two-phase delivery orchestrator
//! - [`classify`]: fault-to-error-kind classification
//! - [`probe`]: verify-only settings probing
//! - [`report`]: per-message outcome streaming
//! - [`transport`]: the pooled transport abstraction and lettre backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod classify;
mod error;
pub mod probe;
pub mod report;
pub mod transport;

pub use batch::{run_batch, send_batch};
pub use classify::classify;
pub use error::{DeliveryError, ErrorKind};
pub use probe::{probe_settings, probe_transport};
pub use report::{DeliveryOutcome, OutcomeSink};
pub use transport::{
    FaultPhase, LettreTransport, MailTransport, SendReceipt, TransportFault, build_transport,
};
