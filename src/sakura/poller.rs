//! Bounded status polling.
//!
//! A poller checks first and sleeps between checks. Once the elapsed time
//! exceeds the ceiling it gives up with [`ApiError::Timeout`].

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{ApiError, Result, SakuraError};

/// Fixed-interval poller with a timeout.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    /// Delay between checks.
    interval: Duration,
    /// Maximum total wait.
    timeout: Duration,
}

impl StatusPoller {
    /// Creates a poller.
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Repeatedly runs `check` until it yields `Some`.
    ///
    /// `resource` and `expected_state` only label logs and the timeout error.
    ///
    /// # Errors
    ///
    /// Returns the first error from `check`, or a timeout error.
    pub async fn wait_for<T, F, Fut>(
        &self,
        resource: &str,
        expected_state: &str,
        mut check: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            if let Some(value) = check().await? {
                debug!("{resource} reached {expected_state} after {attempts} check(s)");
                return Ok(value);
            }

            if start.elapsed() >= self.timeout {
                return Err(SakuraError::Api(ApiError::Timeout {
                    resource: resource.to_string(),
                    expected_state: expected_state.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                }));
            }

            debug!(
                "{resource} not yet {expected_state}, checking again in {}s",
                self.interval.as_secs()
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
