//! Fixed-interval retry for transient cloud errors.
//!
//! Attempts the operation immediately, then polls at a fixed interval
//! while the error stays in the retryable class, until the deadline
//! elapses. Any non-retryable error returns after exactly one call.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::CloudError;

/// Runs `operation` until it succeeds, fails non-retryably, or times out.
///
/// On timeout the last observed error is returned; the caller decides how
/// to wrap it.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last retryable error once
/// the deadline passes.
pub async fn retry_immediate_on_error<F, Fut, P>(
    poll_interval: Duration,
    timeout: Duration,
    retryable: P,
    mut operation: F,
) -> Result<(), CloudError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), CloudError>>,
    P: Fn(&CloudError) -> bool,
{
    let deadline = Instant::now() + timeout;

    loop {
        match operation().await {
            Ok(()) => return Ok(()),
            Err(err) if retryable(&err) => {
                if Instant::now() + poll_interval > deadline {
                    debug!("Retry deadline elapsed: {err}");
                    return Err(err);
                }
                debug!(
                    "Retryable error, polling again in {}ms: {err}",
                    poll_interval.as_millis()
                );
                sleep(poll_interval).await;
            }
            Err(err) => return Err(err),
        }
    }
}
