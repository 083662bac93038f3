//! Retry policies for flood-control and timeout errors.
//!
//! The policy only decides; [`retry_with`] owns the loop and the sleeping, so
//! both can be tested with a recording [`Sleeper`] instead of a real clock.

use std::future::Future;
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// Controls how a failed request is handled.
pub trait RetryPolicy {
    /// `Continue(delay)` sleeps `delay` and repeats the request, `Break` gives up.
    fn should_retry(&self, ctx: &RetryContext<'_>) -> ControlFlow<(), Duration>;
}

/// Context passed to [`RetryPolicy::should_retry`] on each failure.
pub struct RetryContext<'a> {
    pub fail_count: NonZeroU32,
    pub slept_so_far: Duration,
    pub error: &'a Error,
}

/// Sleep for as long as the server asks on flood-control, a fixed delay on
/// timeouts, and retry without limit.
#[derive(Debug, Clone)]
pub struct FloodWaitRetry {
    pub timeout_delay: Duration,
}

impl Default for FloodWaitRetry {
    fn default() -> Self {
        Self {
            timeout_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy for FloodWaitRetry {
    fn should_retry(&self, ctx: &RetryContext<'_>) -> ControlFlow<(), Duration> {
        if !ctx.error.is_transient() {
            return ControlFlow::Break(());
        }
        match ctx.error {
            Error::FloodWait { seconds } => ControlFlow::Continue(Duration::from_secs(*seconds)),
            Error::Timeout => ControlFlow::Continue(self.timeout_delay),
            _ => ControlFlow::Break(()),
        }
    }
}

/// Source of pauses. Production code sleeps on the tokio timer.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<S: Sleeper> Sleeper for &S {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        S::sleep(*self, duration)
    }
}

/// Run `op` until it succeeds or `policy` refuses another attempt.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with<T, P, S, F, Fut>(policy: &P, sleeper: &S, mut op: F) -> Result<T>
where
    P: RetryPolicy,
    S: Sleeper,
    F: FnMut(NonZeroU32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut fail_count = NonZeroU32::MIN;
    let mut slept_so_far = Duration::ZERO;

    loop {
        let error = match op(fail_count).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let ctx = RetryContext {
            fail_count,
            slept_so_far,
            error: &error,
        };
        match policy.should_retry(&ctx) {
            ControlFlow::Continue(delay) => {
                warn!(
                    "{} (attempt {}, slept {:?} so far), retrying in {:?}",
                    ctx.error, ctx.fail_count, ctx.slept_so_far, delay
                );
                sleeper.sleep(delay).await;
                slept_so_far += delay;
                fail_count = fail_count.saturating_add(1);
            }
            ControlFlow::Break(()) => return Err(error),
        }
    }
}
