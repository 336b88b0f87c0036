use std::future::Future;
use std::time::Duration;

use crate::{Result, StoreError};

/// Bound applied to every store call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a store operation, failing with `Timeout` if it does not finish
/// within `limit`.
///
/// The inner future is dropped on timeout, which aborts the in-flight call.
pub async fn with_timeout<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?limit, "store operation timed out");
            Err(StoreError::Timeout {
                operation,
                after: limit,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_bound() {
        let result = with_timeout(Duration::from_secs(1), "fast", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn passes_inner_errors_through() {
        let result: Result<()> = with_timeout(Duration::from_secs(1), "failing", async {
            Err(StoreError::InvalidLimit { limit: 0 })
        })
        .await;
        assert!(matches!(result, Err(StoreError::InvalidLimit { .. })));
    }

    #[tokio::test]
    async fn slow_operation_times_out() {
        let result: Result<()> = with_timeout(
            Duration::from_millis(10),
            "stuck",
            std::future::pending(),
        )
        .await;

        assert!(matches!(
            result,
            Err(StoreError::Timeout {
                operation: "stuck",
                ..
            })
        ));
    }
}
