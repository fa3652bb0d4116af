//! Cancellation helpers
//!
//! Runs observe a [`CancellationToken`]; once cancelled it stays cancelled.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancel `token` once `duration` has elapsed
///
/// The timer stops early if the token is cancelled by someone else.
pub fn cancel_after(token: &CancellationToken, duration: Duration) -> JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(duration) => {
                info!("Search timed out after {}s, cancelling", duration.as_secs_f32());
                token.cancel();
            }
        }
    })
}
