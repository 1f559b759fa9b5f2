//! Deadlines for collaborator calls
//!
//! Dropping an operation's future cancels it. These helpers bound how long a
//! caller waits; an elapsed deadline surfaces as [`Error::DeadlineExceeded`] and
//! is never retried.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::Error;

/// Run `future` until it completes or `deadline` passes
pub async fn with_deadline<F, T>(deadline: Instant, future: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout_at(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Operation cancelled after its deadline elapsed");
            Err(Error::DeadlineExceeded)
        }
    }
}

/// Run `future` for at most `timeout`
pub async fn with_timeout<F, T>(timeout: Duration, future: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    with_deadline(Instant::now() + timeout, future).await
}
