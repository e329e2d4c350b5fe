//! Retry with exponential backoff for transient transport failures

use std::future::Future;
use std::time::Duration;

use super::error::ArtifactoryError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Re-attempts after the first try
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Exponential backoff: initial * 2^(attempt-1), capped
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt.saturating_sub(1)).min(10);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Send a request, retrying transient failures.
///
/// Non-success statuses are turned into [`ArtifactoryError::Status`], so an
/// `Ok` response is always a 2xx.
pub async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut send: F,
) -> Result<reqwest::Response, ArtifactoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, ArtifactoryError>>,
{
    let mut attempt = 0;

    loop {
        let result = match send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(ArtifactoryError::from_response(response).await),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => return Ok(response),
            Err(e) if attempt < policy.max_retries && e.is_transient() => {
                attempt += 1;
                let backoff = policy.backoff(attempt);
                tracing::debug!(
                    operation,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Retrying after transient error"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
