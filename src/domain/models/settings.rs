use std::time::Duration;

/// Transport tuning handed to the repository client handle.
///
/// Zero is a legal value everywhere: `threads = 0` runs transfers one at a
/// time and a zero timeout disables that timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResilienceSettings {
    /// Log mutating requests instead of sending them
    pub dry_run: bool,
    /// Maximum concurrent per-item transfers inside one backend call
    pub threads: usize,
    pub dial_timeout: Duration,
    pub request_timeout: Duration,
    /// Re-attempts for transient transport failures
    pub retries: u32,
}

impl ResilienceSettings {
    pub const DEFAULT_THREADS: usize = 3;
    pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10 * 60);
    pub const DEFAULT_RETRIES: u32 = 3;

    /// Concurrency actually used for per-item transfers
    pub fn effective_threads(&self) -> usize {
        self.threads.max(1)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero(self.dial_timeout)
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        non_zero(self.request_timeout)
    }
}

fn non_zero(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            threads: Self::DEFAULT_THREADS,
            dial_timeout: Self::DEFAULT_DIAL_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            retries: Self::DEFAULT_RETRIES,
        }
    }
}
