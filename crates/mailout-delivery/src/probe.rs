//! Settings probing.

use crate::classify::classify;
use crate::error::{DeliveryError, ErrorKind};
use crate::transport::{MailTransport, build_transport};
use mailout_core::ConnectionSettings;
use tracing::debug;

/// Validates connection settings with a single verify round trip.
///
/// Connects and authenticates without sending mail, then releases the
/// connection regardless of outcome. With `check_auth` set to false an
/// authentication failure is treated as success, for callers that only
/// want to confirm the server is reachable (for example a
/// provider-supplied relay whose credentials are known good); every
/// other failure kind is always reported.
///
/// # Errors
///
/// Returns the classified [`DeliveryError`] for any failure that is not
/// a suppressed authentication failure.
pub async fn probe_settings(
    settings: &ConnectionSettings,
    check_auth: bool,
) -> Result<(), DeliveryError> {
    let transport = build_transport(settings)?;
    probe_transport(&transport, check_auth).await
}

/// Runs the verify round trip against an already-built transport.
///
/// The transport is always closed afterward, on both paths.
///
/// # Errors
///
/// Same contract as [`probe_settings`].
pub async fn probe_transport<T: MailTransport>(
    transport: &T,
    check_auth: bool,
) -> Result<(), DeliveryError> {
    let result = transport.verify().await;
    transport.close().await;

    match result {
        Ok(()) => {
            debug!("settings verified");
            Ok(())
        }
        Err(fault) => {
            let error = classify(&fault);
            if !check_auth && error.kind == ErrorKind::Auth {
                debug!(details = %error.details, "auth failure suppressed by caller");
                return Ok(());
            }
            Err(error)
        }
    }
}
