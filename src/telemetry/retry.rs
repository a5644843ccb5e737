use std::future::Future;
use std::io;
use std::time::Duration;

/// Bounded retry for I/O-class failures with a pluggable backoff schedule.
///
/// The default matches the summary sink contract: five retries after the
/// initial attempt, backing off linearly in whole seconds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: fn(u32) -> Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: fn(u32) -> Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> io::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(error);
                    }
                    tracing::debug!(%error, attempt, "retrying after I/O failure");
                    tokio::time::sleep((self.backoff)(attempt)).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: |attempt| Duration::from_secs(u64::from(attempt)),
        }
    }
}
