//! Cooperative bounded waiting.
//!
//! [`wait_until`] stands in for an engine-side "ready" notification. It
//! polls a predicate on a fixed cadence and suspends the calling task
//! between polls, so the runtime keeps driving other tasks (loader timers,
//! pending disposals) while a file loads.
//!
//! Elapsed time is measured with [`tokio::time::Instant`], which follows the
//! runtime clock. Under a paused test clock a 10 second timeout completes
//! without 10 real seconds passing.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::error::ProbeError;

/// Poll `predicate` every `poll_interval` until it returns `true`.
///
/// The elapsed-time check runs before the predicate on every tick, so the
/// predicate is never consulted once `max_wait` has passed.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] carrying `max_wait` once more than
/// `max_wait` has elapsed since the wait began.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use playprobe::wait::wait_until;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut polls = 0;
/// wait_until(Duration::from_secs(1), Duration::from_millis(1), || {
///     polls += 1;
///     polls == 3
/// })
/// .await
/// .unwrap();
/// # }
/// ```
pub async fn wait_until<F>(
    max_wait: Duration,
    poll_interval: Duration,
    mut predicate: F,
) -> Result<Duration, ProbeError>
where
    F: FnMut() -> bool,
{
    let start_time = Instant::now();
    let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let elapsed = start_time.elapsed();
        if elapsed > max_wait {
            return Err(ProbeError::Timeout { max_wait });
        }
        if predicate() {
            return Ok(elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn times_out_with_configured_maximum() {
        let started = Instant::now();
        let result = wait_until(Duration::from_secs(10), Duration::from_millis(16), || false).await;

        match result {
            Err(ProbeError::Timeout { max_wait }) => assert_eq!(max_wait, Duration::from_secs(10)),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_on_first_tick() {
        let elapsed = wait_until(Duration::from_secs(10), Duration::from_millis(16), || true)
            .await
            .unwrap();
        assert!(elapsed < Duration::from_millis(16));
    }
}
