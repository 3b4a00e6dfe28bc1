//! Retry-until-ready polling
//!
//! [`Poller::wait`] suspends the calling step until a probe reports
//! [`Readiness::Ready`] or the deadline passes. It is the only place the
//! harness waits on the editor's own update loop.
//!
//! Timing rules:
//! - the deadline starts when `wait` is called
//! - a ready first evaluation returns without sleeping
//! - sleeps never overshoot the deadline, so a probe that is never ready
//!   fails within one interval of the limit
//! - probe errors end the wait immediately and are returned as-is

use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::probe::{Probe, Readiness};

/// Default time budget for a single wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default delay between probe evaluations
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Floor for the polling interval; a zero interval would spin
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A wait ran out of time before its probe became ready
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("timed out after {elapsed:?} waiting for condition (limit: {limit:?})")]
pub struct Timeout {
    pub elapsed: Duration,
    pub limit: Duration,
}

/// Stateless polling engine
///
/// Holds only its timing configuration, so one value can be shared (or
/// copied) between any number of concurrent waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_INTERVAL)
    }
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.timeout(), config.interval())
    }

    /// Copy of this poller with a different default timeout
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for `probe` using the default timeout
    pub async fn wait<S, P>(&self, source: &S, probe: P) -> Result<P::Output, P::Error>
    where
        S: ?Sized + Sync,
        P: Probe<S>,
        P::Error: From<Timeout>,
    {
        self.wait_timeout(source, probe, self.timeout).await
    }

    /// Wait for `probe`, overriding the timeout for this call only
    pub async fn wait_timeout<S, P>(
        &self,
        source: &S,
        mut probe: P,
        limit: Duration,
    ) -> Result<P::Output, P::Error>
    where
        S: ?Sized + Sync,
        P: Probe<S>,
        P::Error: From<Timeout>,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            if let Readiness::Ready(value) = probe.evaluate(source).await? {
                debug!(
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Probe ready"
                );
                return Ok(value);
            }

            let elapsed = start.elapsed();
            if elapsed >= limit {
                warn!(
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    limit_ms = limit.as_millis() as u64,
                    "Probe not ready before deadline"
                );
                return Err(Timeout { elapsed, limit }.into());
            }

            sleep(self.interval.min(limit - elapsed)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{probe_fn, sample_fn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Timeout(Timeout),
        Rejected(&'static str),
    }

    impl From<Timeout> for TestError {
        fn from(t: Timeout) -> Self {
            TestError::Timeout(t)
        }
    }

    fn poller() -> Poller {
        Poller::new(Duration::from_millis(250), Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_immediately_does_not_sleep() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();

        let value = poller()
            .wait(
                &calls,
                sample_fn::<_, usize, TestError, _>(|calls: &AtomicUsize| {
                    Box::pin(async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) })
                }),
            )
            .await
            .unwrap();

        assert_eq!(value, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_times_out_within_one_interval() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();

        let err = poller()
            .wait(
                &calls,
                probe_fn::<_, (), TestError, _>(|calls: &AtomicUsize| {
                    Box::pin(async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(Readiness::NotReady)
                    })
                }),
            )
            .await
            .unwrap_err();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed <= Duration::from_millis(350));
        match err {
            TestError::Timeout(t) => {
                assert_eq!(t.limit, Duration::from_millis(250));
                assert!(t.elapsed >= t.limit);
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
        // 0, 100, 200 and the final evaluation at the deadline
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_evaluates_once() {
        let calls = AtomicUsize::new(0);

        let err = poller()
            .wait_timeout(
                &calls,
                probe_fn::<_, (), TestError, _>(|calls: &AtomicUsize| {
                    Box::pin(async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(Readiness::NotReady)
                    })
                }),
                Duration::ZERO,
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TestError::Timeout(Timeout {
                elapsed: Duration::ZERO,
                limit: Duration::ZERO,
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_is_not_retried() {
        let calls = AtomicUsize::new(0);

        let err = poller()
            .wait(
                &calls,
                probe_fn::<_, (), TestError, _>(|calls: &AtomicUsize| {
                    Box::pin(async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(TestError::Rejected("no such window"))
                    })
                }),
            )
            .await
            .unwrap_err();

        assert_eq!(err, TestError::Rejected("no such window"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_a_few_attempts() {
        let calls = AtomicUsize::new(0);

        let value = Poller::new(Duration::from_secs(2), Duration::from_millis(50))
            .wait(
                &calls,
                probe_fn::<_, usize, TestError, _>(|calls: &AtomicUsize| {
                    Box::pin(async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        Ok(if n == 3 { Readiness::Ready(n) } else { Readiness::NotReady })
                    })
                }),
            )
            .await
            .unwrap();

        assert_eq!(value, 3);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let poller = Poller::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(poller.interval(), MIN_INTERVAL);
    }
}
