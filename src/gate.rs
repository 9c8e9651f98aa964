//! The window gate: admits a fixed number of callers per window and makes
//! everyone after that wait for the window to end.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt};
use futures::pin_mut;
use futures_timer::Delay;
use parking_lot::Mutex;
use tokio::sync::Mutex as AccessLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::clock::{self, Reference, Scheduler};
use crate::errors::{Cancelled, InvalidQuota};
use crate::Quota;

/// How often a waiter re-reads the clock when its boundary timer was dropped.
const BOUNDARY_POLL: Duration = Duration::from_millis(50);

mod window;
pub use window::WindowSnapshot;
use window::{Decision, WindowState};

mod streams;
pub use streams::*;

/// How a caller got through a [`WindowGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Admission {
    /// The caller fit into the current window (or opened a new one) and
    /// was let through right away.
    Immediate,

    /// The window's quota was exhausted; the caller was let through only
    /// once the window had rolled over.
    AfterWait,
}

impl Admission {
    /// Returns `true` if the caller had to wait for the window to roll over.
    pub fn waited(self) -> bool {
        self == Admission::AfterWait
    }
}

impl From<Admission> for bool {
    fn from(admission: Admission) -> bool {
        admission.waited()
    }
}

/// A fixed-window admission gate.
///
/// The gate admits up to [`Quota::capacity`] callers per window. The first
/// caller opens a window of [`Quota::window`] length; callers arriving after
/// the window has ended open the next one. A caller that exceeds the quota
/// waits until the current window is over, and is then counted as the first
/// admission of the next window.
///
/// Callers pass through the gate one at a time, in the order they arrived.
/// A caller waiting for the window to end keeps its place at the front, so
/// everyone behind it queues until it has been admitted: at most one caller
/// is ever waiting on a window boundary.
///
/// # Example
///
/// ```rust
/// # use futures::executor::block_on;
/// # use nonzero_ext::nonzero;
/// # use std::time::Duration;
/// use window_gate::{clock::MonotonicClock, Admission, Quota, WindowGate};
///
/// let quota = Quota::with_window(nonzero!(2u32), Duration::from_millis(20)).unwrap();
/// let gate = WindowGate::with_clock(quota, MonotonicClock);
/// assert_eq!(Admission::Immediate, block_on(gate.until_admitted()));
/// assert_eq!(Admission::Immediate, block_on(gate.until_admitted()));
/// // the third caller in the same window has to wait it out:
/// assert_eq!(Admission::AfterWait, block_on(gate.until_admitted()));
/// ```
pub struct WindowGate<C: Scheduler = clock::DefaultClock> {
    quota: Quota,
    clock: C,
    access: AccessLock<()>,
    state: Arc<Mutex<WindowState<C::Instant>>>,
}

/// # Constructors
impl WindowGate<clock::DefaultClock> {
    /// Constructs a gate for a quota with the default real-time clock.
    pub fn new(quota: Quota) -> Self {
        Self::with_clock(quota, clock::DefaultClock::default())
    }

    /// Constructs a gate admitting `capacity` callers per `window`, with the
    /// default real-time clock.
    ///
    /// Fails if either parameter is zero.
    pub fn try_new(capacity: u32, window: Duration) -> Result<Self, InvalidQuota> {
        Ok(Self::new(Quota::new(capacity, window)?))
    }
}

impl<C: Scheduler> WindowGate<C> {
    /// Constructs a gate for a quota with a custom clock.
    pub fn with_clock(quota: Quota, clock: C) -> Self {
        WindowGate {
            quota,
            clock,
            access: AccessLock::new(()),
            state: Arc::new(Mutex::new(WindowState::default())),
        }
    }

    /// The quota this gate enforces.
    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// The maximum number of admissions per window.
    pub fn capacity(&self) -> NonZeroU32 {
        self.quota.capacity
    }

    /// The length of a window.
    pub fn window(&self) -> Duration {
        self.quota.window
    }

    /// The clock this gate reads time from and schedules window boundaries on.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the window that is currently open, if any caller has opened one yet.
    ///
    /// A returned window may already be stale: it is only replaced when the next
    /// caller arrives, or when a waiting caller's boundary timer fires.
    pub fn current_window(&self) -> Option<WindowSnapshot<C::Instant>> {
        self.state.lock().current()
    }

    /// Waits until the gate admits the caller, or until `cancel` fires.
    ///
    /// Resolves to [`Admission::Immediate`] if the caller fit into the
    /// current window's quota, and to [`Admission::AfterWait`] if it had to
    /// wait for the window to roll over first.
    ///
    /// If `cancel` fires first, whether the caller was still queued behind
    /// others or already waiting for the window boundary, this returns
    /// [`Cancelled`] and leaves the gate to the next caller. A boundary timer
    /// that the cancelled caller had set up still fires and rolls the window
    /// over; the cancelled caller's admission stays counted in the new window.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<Admission, Cancelled> {
        self.admit_or(cancel.cancelled().map(|()| Cancelled)).await
    }

    /// Waits until the gate admits the caller.
    ///
    /// This is [`admit`](WindowGate::admit) without a cancellation token;
    /// dropping the returned future abandons the wait in the same way.
    pub async fn until_admitted(&self) -> Admission {
        match self.admit_or(future::pending::<Infallible>()).await {
            Ok(admission) => admission,
            Err(never) => match never {},
        }
    }

    async fn admit_or<E, F>(&self, interrupted: F) -> Result<Admission, E>
    where
        F: Future<Output = E>,
    {
        pin_mut!(interrupted);

        // The access lock stays held until this caller has been admitted, including
        // the wait for the window boundary.
        let lock = self.access.lock();
        pin_mut!(lock);
        let access = match future::select(interrupted.as_mut(), lock).await {
            Either::Left((e, _)) => {
                debug!("admission cancelled while queued");
                return Err(e);
            }
            Either::Right((guard, _)) => guard,
        };

        let now = self.clock.now();
        let boundary = match self.enter(now) {
            Decision::Opened => {
                debug!(?now, "opened a fresh window");
                return Ok(Admission::Immediate);
            }
            Decision::Within { count } => {
                trace!(count, capacity = self.quota.capacity.get(), "admitted within window");
                return Ok(Admission::Immediate);
            }
            Decision::Overflow { boundary } => boundary,
        };
        debug!(?now, ?boundary, "quota exhausted, waiting for window boundary");

        let (tx, rx) = oneshot::channel();
        let state = Arc::clone(&self.state);
        let length = self.quota.window;
        self.clock.schedule_at(
            boundary,
            Box::new(move |fired_at| {
                let opened = state.lock().roll_over(boundary, fired_at, length);
                debug!(?fired_at, opened, "window boundary passed");
                // The waiter may have been cancelled in the meantime.
                let _ = tx.send(());
            }),
        );

        let outcome = match future::select(interrupted, rx).await {
            Either::Left((e, _)) => {
                debug!(?boundary, "admission cancelled while waiting for window boundary");
                Err(e)
            }
            Either::Right((Ok(()), _)) => Ok(Admission::AfterWait),
            Either::Right((Err(oneshot::Canceled), interrupted)) => {
                warn!(?boundary, "scheduler dropped the window boundary timer");
                let passed = self.boundary_passed(boundary);
                pin_mut!(passed);
                match future::select(interrupted, passed).await {
                    Either::Left((e, _)) => {
                        debug!(?boundary, "admission cancelled while waiting for window boundary");
                        Err(e)
                    }
                    Either::Right((now, _)) => {
                        let opened = self.state.lock().roll_over(boundary, now, length);
                        debug!(?now, opened, "window boundary passed");
                        Ok(Admission::AfterWait)
                    }
                }
            }
        };
        drop(access);
        outcome
    }

    /// Re-reads the clock until it has reached `boundary`, and returns that reading.
    async fn boundary_passed(&self, boundary: C::Instant) -> C::Instant {
        loop {
            let now = self.clock.now();
            if now >= boundary {
                return now;
            }
            Delay::new(boundary.duration_since(now).min(BOUNDARY_POLL)).await;
        }
    }

    fn enter(&self, now: C::Instant) -> Decision<C::Instant> {
        self.state
            .lock()
            .enter(now, self.quota.capacity, self.quota.window)
    }
}

impl<C: Scheduler> fmt::Debug for WindowGate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowGate")
            .field("quota", &self.quota)
            .field("window", &self.current_window())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{Clock, FakeRelativeClock, Nanos};
    use futures::executor::block_on;

    fn gate(capacity: u32) -> WindowGate<FakeRelativeClock> {
        let quota = Quota::new(capacity, Duration::from_secs(1)).unwrap();
        WindowGate::with_clock(quota, FakeRelativeClock::default())
    }

    #[test]
    fn admission_impls() {
        assert!(Admission::AfterWait.waited());
        assert!(!Admission::Immediate.waited());
        assert!(bool::from(Admission::AfterWait));
        assert!(!bool::from(Admission::Immediate));
    }

    #[test]
    fn accessors() {
        let gate = gate(3);
        assert_eq!(3, gate.capacity().get());
        assert_eq!(Duration::from_secs(1), gate.window());
        assert_eq!(Quota::new(3, Duration::from_secs(1)), Ok(gate.quota()));
        assert_eq!(Nanos::default(), gate.clock().now());
        assert_eq!(None, gate.current_window());
    }

    #[test]
    fn try_new_validates() {
        assert_eq!(
            InvalidQuota::ZeroCapacity,
            WindowGate::try_new(0, Duration::from_secs(1)).unwrap_err()
        );
        assert_eq!(
            InvalidQuota::ZeroWindow,
            WindowGate::try_new(1, Duration::ZERO).unwrap_err()
        );
        assert!(WindowGate::try_new(1, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn first_admission_opens_window() {
        let gate = gate(1);
        gate.clock().advance(Duration::from_secs(5));
        assert_eq!(Admission::Immediate, block_on(gate.until_admitted()));
        let window = gate.current_window().unwrap();
        assert_eq!(Nanos::from(Duration::from_secs(5)), window.start());
        assert_eq!(Nanos::from(Duration::from_secs(6)), window.end());
        assert_eq!(1, window.count());
    }

    #[test]
    fn already_cancelled_token_never_enters() {
        let gate = gate(1);
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(Err(Cancelled), block_on(gate.admit(&token)));
        assert_eq!(None, gate.current_window());
    }

    #[test]
    fn gate_impls_coverage() {
        let gate = gate(2);
        block_on(gate.until_admitted());
        let debug_output = format!("{:?}", gate);
        assert!(debug_output.contains("WindowGate"));
        assert!(debug_output.contains("count: 1"));
    }
}
