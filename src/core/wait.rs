//! Suspension helper shared by producers and consumers.

use std::pin::Pin;

use tokio::sync::futures::Notified;
use tokio_util::sync::CancellationToken;

use crate::error::HubError;

/// Waits for `notified`, or for `cancel` if one is given.
///
/// Returns `Err(HubError::Cancelled)` when the token fires first.
pub(crate) async fn notified_or_cancelled(
    notified: Pin<&mut Notified<'_>>,
    cancel: Option<&CancellationToken>,
) -> Result<(), HubError> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = notified => Ok(()),
            _ = token.cancelled() => Err(HubError::Cancelled),
        },
        None => {
            notified.await;
            Ok(())
        }
    }
}
