//! Bounded polling with a fixed interval.
//!
//! Unlike the driver's element waits, a failing check here is not fatal: errors
//! are recorded and the check runs again on the next tick until the deadline.

use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{sleep, Duration, Instant};

/// Result of a [`poll_until`] loop
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    /// Condition held before the deadline
    pub satisfied: bool,
    /// Number of times the condition was evaluated
    pub attempts: usize,
    /// Most recent error swallowed while polling
    pub last_error: Option<String>,
    pub elapsed: Duration,
    /// Stopped early because `cancel` was raised
    pub cancelled: bool,
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

/// Evaluate `check` every `interval` while less than `timeout` has elapsed.
///
/// The condition is only evaluated while `elapsed < timeout`, so a condition
/// that first holds at exactly `timeout` is reported as unsatisfied.
/// Raising `cancel` ends the loop before the next evaluation.
pub async fn poll_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    cancel: &AtomicBool,
    mut check: F,
) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0usize;
    let mut last_error = None;

    while start.elapsed() < timeout {
        if cancel.load(Ordering::SeqCst) {
            return WaitOutcome {
                satisfied: false,
                attempts,
                last_error,
                elapsed: start.elapsed(),
                cancelled: true,
            };
        }
        attempts += 1;
        match check().await {
            Ok(true) => {
                return WaitOutcome {
                    satisfied: true,
                    attempts,
                    last_error,
                    elapsed: start.elapsed(),
                    cancelled: false,
                }
            }
            Ok(false) => {}
            Err(e) => {
                log::debug!("poll attempt {} failed: {}", attempts, e);
                last_error = Some(e.to_string());
            }
        }
        sleep(interval).await;
    }

    WaitOutcome {
        satisfied: false,
        attempts,
        last_error,
        elapsed: start.elapsed(),
        cancelled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    static NOT_CANCELLED: AtomicBool = AtomicBool::new(false);

    #[tokio::test(start_paused = true)]
    async fn returns_as_soon_as_condition_holds() {
        let calls = AtomicUsize::new(0);
        let outcome = poll_until(Duration::from_secs(60), Duration::from_secs(1), &NOT_CANCELLED, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<bool, anyhow::Error>(n >= 3) }
        })
        .await;

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.elapsed, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_swallowed_and_retried() {
        let calls = AtomicUsize::new(0);
        let outcome = poll_until(Duration::from_secs(10), Duration::from_secs(1), &NOT_CANCELLED, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    anyhow::bail!("no such element")
                }
                Ok(true)
            }
        })
        .await;

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last_error.as_deref(), Some("no such element"));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_the_deadline() {
        let outcome = poll_until(Duration::from_secs(5), Duration::from_secs(1), &NOT_CANCELLED, || async {
            Ok::<bool, anyhow::Error>(false)
        })
        .await;

        assert!(!outcome.is_satisfied());
        assert_eq!(outcome.attempts, 5);
        assert_eq!(outcome.elapsed, Duration::from_secs(5));
        assert!(!outcome.cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn raised_cancel_flag_stops_polling_early() {
        let cancel = AtomicBool::new(false);
        let calls = AtomicUsize::new(0);
        let outcome = poll_until(Duration::from_secs(60), Duration::from_secs(1), &cancel, || {
            if calls.fetch_add(1, Ordering::SeqCst) == 2 {
                cancel.store(true, Ordering::SeqCst);
            }
            async { Ok::<bool, anyhow::Error>(false) }
        })
        .await;

        assert!(outcome.cancelled);
        assert!(!outcome.is_satisfied());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.elapsed, Duration::from_secs(3));
    }
}
