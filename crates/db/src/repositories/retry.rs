//! Bounded retry of operations that lost an optimistic race.

use std::future::Future;

use stockwise_core::StockError;

/// Runs `run` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made. Each attempt opens its own
/// transaction.
pub(crate) async fn with_retries<T, F, Fut>(
    operation: &'static str,
    max_attempts: u32,
    mut run: F,
) -> Result<T, StockError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StockError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match run().await {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                tracing::warn!(operation, attempt, max_attempts, "concurrent modification, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
