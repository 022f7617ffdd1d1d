//! Outbound call pacing
//!
//! One limiter is shared by every task that talks to the upstream. It
//! enforces a minimum spacing between calls, an optional long-window call
//! budget, and run-wide suspensions after a throttle response. Requests
//! made through [`RateLimiter::run`] never overlap.

use crate::error::SourceError;
use governor::{DefaultDirectRateLimiter, Quota};
use rand::Rng;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tierforge_common::config::RateLimitConfig;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct PacingState {
    last_request: Option<Instant>,
    suspended_until: Option<Instant>,
}

/// Shared pacing for all upstream calls
pub struct RateLimiter {
    state: Mutex<PacingState>,
    /// Held from dispatch until the response is handled
    egress: Mutex<()>,
    min_interval: Duration,
    throttle_fallback: Duration,
    max_throttle_wait: Duration,
    jitter: Duration,
    max_retries: u32,
    budget: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Mutex::new(PacingState::default()),
            egress: Mutex::new(()),
            min_interval: config.min_interval(),
            throttle_fallback: config.throttle_fallback(),
            max_throttle_wait: config.max_throttle_wait(),
            jitter: config.jitter(),
            max_retries: config.max_retries,
            budget: budget_quota(config).map(DefaultDirectRateLimiter::direct),
        }
    }

    /// Wait until the next outbound call is allowed
    ///
    /// The pacing lock is held while sleeping, so concurrent callers are
    /// dispatched one at a time.
    pub async fn throttle(&self) {
        if let Some(budget) = &self.budget {
            budget.until_ready().await;
        }

        let mut state = self.state.lock().await;
        let now = Instant::now();
        let mut ready_at = now;
        if let Some(last) = state.last_request {
            ready_at = ready_at.max(last + self.min_interval);
        }
        if let Some(until) = state.suspended_until {
            ready_at = ready_at.max(until);
        }

        if ready_at > now {
            let wait = ready_at - now;
            debug!("Rate limiting: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        state.suspended_until = None;
        state.last_request = Some(Instant::now());
    }

    /// Suspend all further calls after a throttle response
    ///
    /// Uses the upstream's retry-after hint when present, otherwise the
    /// configured fallback. The wait is capped and a random jitter added.
    /// Returns the suspension applied.
    pub async fn handle_throttle_signal(&self, retry_after: Option<Duration>) -> Duration {
        let base = retry_after
            .unwrap_or(self.throttle_fallback)
            .min(self.max_throttle_wait);
        let wait = base + self.random_jitter();

        let mut state = self.state.lock().await;
        let until = Instant::now() + wait;
        state.suspended_until = Some(match state.suspended_until {
            Some(existing) => existing.max(until),
            None => until,
        });
        wait
    }

    /// Run one logical request under pacing
    ///
    /// Only one request is in flight at a time across all callers. A
    /// throttle response suspends the limiter before the next caller is let
    /// through, and the same request is retried at most `max_retries` times.
    /// Any other outcome is returned as is.
    pub async fn run<T, F, Fut>(&self, what: &str, mut request: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempts = 0u32;
        loop {
            let _egress = self.egress.lock().await;
            self.throttle().await;
            attempts += 1;

            match request().await {
                Err(SourceError::RateLimited { retry_after }) => {
                    if attempts > self.max_retries {
                        warn!(request = %what, attempts, "Throttled again, giving up on request");
                        return Err(SourceError::ThrottleExhausted(attempts));
                    }
                    let wait = self.handle_throttle_signal(retry_after).await;
                    warn!(request = %what, wait = ?wait, "Throttled by upstream, suspending calls");
                }
                other => return other,
            }
        }
    }

    fn random_jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

/// Long-window budget as a governor quota; `None` when disabled
fn budget_quota(config: &RateLimitConfig) -> Option<Quota> {
    let requests = NonZeroU32::new(config.budget_requests)?;
    let window = config.budget_window();
    if window.is_zero() {
        return None;
    }
    let period = window / requests.get();
    Quota::with_period(period).map(|quota| quota.allow_burst(requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config(min_interval_ms: u64, max_retries: u32) -> RateLimitConfig {
        RateLimitConfig {
            min_interval_ms,
            throttle_fallback_secs: 0,
            max_throttle_wait_secs: 1,
            max_retries,
            jitter_ms: 0,
            budget_requests: 0,
            budget_window_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_throttle_spacing() {
        let limiter = RateLimiter::new(&config(200, 1));
        let start = Instant::now();

        limiter.throttle().await;
        let first = start.elapsed();
        limiter.throttle().await;
        limiter.throttle().await;
        let third = start.elapsed();

        assert!(first < Duration::from_millis(100));
        assert!(third >= Duration::from_millis(380));
    }

    #[tokio::test]
    async fn test_single_retry_after_throttle() {
        let limiter = RateLimiter::new(&config(0, 1));
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result = limiter
            .run("detail", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(SourceError::RateLimited {
                        retry_after: Some(Duration::from_millis(50)),
                    })
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let limiter = RateLimiter::new(&config(0, 1));
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<(), SourceError> = limiter
            .run("detail", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::RateLimited {
                    retry_after: Some(Duration::from_millis(10)),
                })
            })
            .await;

        assert!(matches!(result, Err(SourceError::ThrottleExhausted(2))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_is_not_retried() {
        let limiter = RateLimiter::new(&config(0, 3));
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<(), SourceError> = limiter
            .run("ids", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::Forbidden(403))
            })
            .await;

        assert!(matches!(result, Err(SourceError::Forbidden(403))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_requests_never_overlap() {
        let limiter = Arc::new(RateLimiter::new(&config(50, 1)));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|n| {
                let limiter = Arc::clone(&limiter);
                let in_flight = Arc::clone(&in_flight);
                let max_in_flight = Arc::clone(&max_in_flight);
                tokio::spawn(async move {
                    limiter
                        .run("detail", || {
                            let in_flight = Arc::clone(&in_flight);
                            let max_in_flight = Arc::clone(&max_in_flight);
                            async move {
                                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                                max_in_flight.fetch_max(now, Ordering::SeqCst);
                                tokio::time::sleep(Duration::from_millis(120)).await;
                                in_flight.fetch_sub(1, Ordering::SeqCst);
                                Ok::<_, SourceError>(n)
                            }
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_throttle_suspends_queued_callers() {
        let limiter = Arc::new(RateLimiter::new(&config(0, 1)));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    limiter
                        .run("detail", || {
                            let calls = Arc::clone(&calls);
                            async move {
                                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                                    tokio::time::sleep(Duration::from_millis(50)).await;
                                    Err(SourceError::RateLimited {
                                        retry_after: Some(Duration::from_millis(200)),
                                    })
                                } else {
                                    Ok(start.elapsed())
                                }
                            }
                        })
                        .await
                })
            })
            .collect();

        // Every successful call was dispatched after the suspension ended
        for task in tasks {
            let sent_at = task.await.unwrap().unwrap();
            assert!(sent_at >= Duration::from_millis(240));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_throttle_signal_is_capped() {
        let mut cfg = config(0, 1);
        cfg.max_throttle_wait_secs = 0;
        let limiter = RateLimiter::new(&cfg);

        let wait = limiter
            .handle_throttle_signal(Some(Duration::from_secs(600)))
            .await;
        assert_eq!(wait, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_suspension_delays_next_call() {
        let limiter = RateLimiter::new(&config(0, 1));
        limiter
            .handle_throttle_signal(Some(Duration::from_millis(150)))
            .await;

        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(140));
    }

    #[test]
    fn test_budget_disabled_when_zero() {
        assert!(budget_quota(&config(0, 1)).is_none());
        assert!(budget_quota(&RateLimitConfig::default()).is_some());
    }
}
