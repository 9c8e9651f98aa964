use super::{Callback, Clock, Reference, Scheduler};

use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime};

use futures::executor::ThreadPool;
use futures_timer::Delay;

/// The executor that drives all real-time boundary timers. Started on first use.
fn timer_pool() -> Option<&'static ThreadPool> {
    static POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();
    POOL.get_or_init(|| {
        ThreadPool::builder()
            .pool_size(1)
            .name_prefix("window-gate-timer-")
            .create()
            .map_err(|error| tracing::error!(%error, "could not start the timer pool"))
            .ok()
    })
    .as_ref()
}

/// Runs `fire` on the shared timer pool once `delay` has passed.
///
/// If the pool can not be started, `fire` is dropped without running;
/// the gate then waits out the boundary on its own.
pub(crate) fn spawn_timer<F>(delay: Duration, fire: F)
where
    F: FnOnce() + Send + 'static,
{
    match timer_pool() {
        Some(pool) => pool.spawn_ok(async move {
            if !delay.is_zero() {
                Delay::new(delay).await;
            }
            fire();
        }),
        None => tracing::error!(?delay, "dropping boundary timer, no timer pool"),
    }
}

/// The monotonic clock implemented by [`Instant`].
#[derive(Clone, Debug, Default)]
pub struct MonotonicClock;

impl Reference for Instant {
    fn duration_since(&self, earlier: Self) -> Duration {
        self.saturating_duration_since(earlier)
    }
}

impl Clock for MonotonicClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }
}

impl Scheduler for MonotonicClock {
    fn schedule_at(&self, at: Instant, callback: Callback<Instant>) {
        let delay = at.saturating_duration_since(Instant::now());
        spawn_timer(delay, move || callback(Instant::now().max(at)));
    }
}

/// The non-monotonic clock implemented by [`SystemTime`].
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Reference for SystemTime {
    /// Returns the difference in times between the two
    /// SystemTimes. Due to the fallible nature of SystemTimes,
    /// returns the zero duration if a negative duration would
    /// result (e.g. due to system clock adjustments).
    fn duration_since(&self, earlier: Self) -> Duration {
        SystemTime::duration_since(self, earlier).unwrap_or(Duration::ZERO)
    }
}

impl Clock for SystemClock {
    type Instant = SystemTime;

    fn now(&self) -> Self::Instant {
        SystemTime::now()
    }
}

impl Scheduler for SystemClock {
    fn schedule_at(&self, at: SystemTime, callback: Callback<SystemTime>) {
        let delay = at.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO);
        // The wall clock may have been set back while waiting; report the
        // boundary itself in that case.
        spawn_timer(delay, move || callback(SystemTime::now().max(at)));
    }
}
