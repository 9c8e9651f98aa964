//! Time sources and timer schedulers for window gates.
//!
//! A gate needs two things from its clock: the current time, and a
//! way to run a callback once a window boundary has passed. The
//! [`Clock`] trait provides the former, [`Scheduler`] the latter.
//!
//! The time sources contained in this module additionally allow
//! mocking the passage of time: [`FakeRelativeClock`] only moves when
//! the program advances it, and fires due timers as it goes.

use std::fmt::{self, Debug};
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

pub use crate::nanos::Nanos;

/// A measurement from a clock.
pub trait Reference:
    Sized + Add<Duration, Output = Self> + Eq + Ord + Copy + Send + Sync + Debug + 'static
{
    /// Determines the time that separates two measurements of a
    /// clock. Implementations of this must perform a saturating
    /// subtraction - if the `earlier` timestamp should be later,
    /// `duration_since` must return the zero duration.
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// A time source used by window gates.
pub trait Clock: Clone {
    /// A measurement of a monotonically increasing clock.
    type Instant: Reference;

    /// Returns a measurement of the clock.
    fn now(&self) -> Self::Instant;
}

/// A one-shot timer callback. It receives the instant at which it fired.
pub type Callback<P> = Box<dyn FnOnce(P) + Send + 'static>;

/// A clock that can also run a callback once a given instant has passed.
///
/// Implementations must eventually invoke every callback they accept, at
/// or after the requested instant. Callbacks for instants that are already
/// due may run before `schedule_at` returns, so callers must not hold
/// locks that the callback needs.
pub trait Scheduler: Clock + Send + Sync + 'static {
    /// Registers `callback` to fire at (or after) `at`.
    fn schedule_at(&self, at: Self::Instant, callback: Callback<Self::Instant>);
}

impl Reference for Nanos {
    fn duration_since(&self, earlier: Self) -> Duration {
        (*self - earlier).into()
    }
}

struct Timer {
    due: Nanos,
    callback: Callback<Nanos>,
}

/// A mock implementation of a clock. All it does is keep track of
/// what "now" is (relative to some point meaningful to the program),
/// and returns that. Timers registered with it fire only when the
/// clock is [advanced](FakeRelativeClock::advance) past their instant.
///
/// # Thread safety
/// The mock time is represented as an atomic u64 count of nanoseconds, behind an [`Arc`].
/// Clones of this clock will all show the same time and share their pending
/// timers, even if only one of them advances.
#[derive(Clone, Default)]
pub struct FakeRelativeClock {
    now: Arc<AtomicU64>,
    timers: Arc<Mutex<Vec<Timer>>>,
}

impl FakeRelativeClock {
    /// Advances the fake clock by the given amount.
    ///
    /// Every timer that comes due on the way runs synchronously on the
    /// calling thread, earliest first; while a timer runs, the clock reads
    /// that timer's instant. Timers due at the same instant run in the order
    /// they were registered.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(timer) = self.pop_due(target) {
            self.now.fetch_max(timer.due.as_u64(), Ordering::AcqRel);
            (timer.callback)(timer.due);
        }
        self.now.fetch_max(target.as_u64(), Ordering::AcqRel);
    }

    /// Returns the number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().len()
    }

    fn pop_due(&self, target: Nanos) -> Option<Timer> {
        let mut timers = self.timers.lock();
        let (idx, _) = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| t.due)?;
        Some(timers.remove(idx))
    }
}

impl Debug for FakeRelativeClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeRelativeClock")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

impl Clock for FakeRelativeClock {
    type Instant = Nanos;

    fn now(&self) -> Self::Instant {
        self.now.load(Ordering::Acquire).into()
    }
}

impl Scheduler for FakeRelativeClock {
    fn schedule_at(&self, at: Nanos, callback: Callback<Nanos>) {
        let now = self.now();
        if at <= now {
            callback(now);
            return;
        }
        self.timers.lock().push(Timer { due: at, callback });
    }
}

mod with_std;
pub use with_std::*;

#[cfg(feature = "quanta")]
mod quanta;
#[cfg(feature = "quanta")]
pub use self::quanta::*;

mod default;
pub use default::*;
