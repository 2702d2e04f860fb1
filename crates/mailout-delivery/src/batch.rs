//! Two-phase batch delivery orchestration.

use crate::classify::classify;
use crate::error::DeliveryError;
use crate::report::{DeliveryOutcome, OutcomeSink};
use crate::transport::{MailTransport, SendReceipt, TransportFault, build_transport};
use mailout_core::{ConnectionSettings, EmailMessage, MessageId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Pause before the single sequential retry of a failed message.
const RETRY_DELAY: Duration = Duration::from_millis(5);

/// Delivers a batch of messages over one set of connection settings.
///
/// All messages are first submitted concurrently over a shared pooled
/// transport; each message's outcome is pushed to `sink` as soon as its
/// server response arrives. On the first transport fault the shared
/// transport is closed, cancelling the remaining in-flight sends, and
/// every message not yet confirmed is retried one at a time over a fresh
/// transport, with a single short-spaced second attempt per message. A
/// message that fails both sequential attempts aborts the whole batch:
/// its classified error is returned and the remaining unsent messages
/// are never attempted and never produce an outcome.
///
/// Submission is at-least-once, not exactly-once: when a connection
/// drops after the server may already have taken a message, the retry
/// can deliver a duplicate to that recipient.
///
/// # Errors
///
/// Returns the classified [`DeliveryError`] that aborted the batch.
pub async fn send_batch<S>(
    settings: &ConnectionSettings,
    messages: Vec<EmailMessage>,
    sink: &S,
) -> Result<(), DeliveryError>
where
    S: OutcomeSink,
{
    run_batch(|| build_transport(settings), messages, sink).await
}

/// [`send_batch`] over a caller-supplied transport factory.
///
/// The factory is invoked once per phase that needs a transport: the
/// parallel submission gets one, and the sequential retry gets a fresh
/// one because a fault invalidates pooled state.
///
/// # Errors
///
/// Returns the classified [`DeliveryError`] that aborted the batch.
pub async fn run_batch<T, F, S>(
    factory: F,
    messages: Vec<EmailMessage>,
    sink: &S,
) -> Result<(), DeliveryError>
where
    T: MailTransport + 'static,
    F: Fn() -> Result<T, DeliveryError>,
    S: OutcomeSink,
{
    if messages.is_empty() {
        return Ok(());
    }

    debug!(count = messages.len(), "parallel submission started");
    let transport = Arc::new(factory()?);
    let mut completed: HashSet<MessageId> = HashSet::new();
    let mut tasks = JoinSet::new();

    for message in messages.iter().cloned() {
        let transport = Arc::clone(&transport);
        tasks.spawn(async move {
            let result = transport.send(&message).await;
            (message.id, result)
        });
    }

    let mut faulted = false;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, Ok(receipt))) => {
                completed.insert(id);
                sink.report(outcome_of(id, &receipt));
            }
            Ok((id, Err(fault))) => {
                warn!(%id, %fault, "parallel send failed; closing shared transport");
                faulted = true;
                tasks.abort_all();
                break;
            }
            Err(join_error) => {
                if join_error.is_panic() {
                    std::panic::resume_unwind(join_error.into_panic());
                }
            }
        }
    }

    if faulted {
        // Drain the aborted set. Sends that finished before the abort
        // landed still count; failures here were induced by the teardown
        // and are not classified as new faults.
        while let Some(joined) = tasks.join_next().await {
            if let Ok((id, result)) = joined {
                match result {
                    Ok(receipt) => {
                        completed.insert(id);
                        sink.report(outcome_of(id, &receipt));
                    }
                    Err(fault) => debug!(%id, %fault, "send failed during teardown"),
                }
            }
        }
    }

    transport.close().await;
    drop(transport);

    if !faulted {
        debug!("all messages submitted in parallel phase");
        return Ok(());
    }

    let unsent: Vec<EmailMessage> = messages
        .into_iter()
        .filter(|m| !completed.contains(&m.id))
        .collect();

    if unsent.is_empty() {
        return Ok(());
    }

    sequential_retry(&factory, unsent, sink).await
}

/// Second phase: one message at a time, in batch order, over a fresh
/// transport.
async fn sequential_retry<T, F, S>(
    factory: &F,
    unsent: Vec<EmailMessage>,
    sink: &S,
) -> Result<(), DeliveryError>
where
    T: MailTransport,
    F: Fn() -> Result<T, DeliveryError>,
    S: OutcomeSink,
{
    debug!(count = unsent.len(), "sequential retry started");
    let transport = factory()?;

    for message in &unsent {
        match send_with_retry(&transport, message).await {
            Ok(receipt) => sink.report(outcome_of(message.id, &receipt)),
            Err(fault) => {
                let error = classify(&fault);
                warn!(id = %message.id, kind = %error.kind, "sequential retry failed; aborting batch");
                transport.close().await;
                return Err(error);
            }
        }
    }

    transport.close().await;
    debug!("sequential retry completed");
    Ok(())
}

/// One attempt plus one short-spaced retry for a single message.
async fn send_with_retry<T: MailTransport>(
    transport: &T,
    message: &EmailMessage,
) -> Result<SendReceipt, TransportFault> {
    match transport.send(message).await {
        Ok(receipt) => Ok(receipt),
        Err(fault) => {
            debug!(id = %message.id, %fault, "send failed; retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            transport.send(message).await
        }
    }
}

fn outcome_of(id: MessageId, receipt: &SendReceipt) -> DeliveryOutcome {
    DeliveryOutcome {
        message_id: id,
        accepted: receipt.all_accepted(),
    }
}
