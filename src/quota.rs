use std::num::NonZeroU32;
use std::time::Duration;

use crate::errors::InvalidQuota;

/// An admission quota: a positive number of admissions per fixed window.
///
/// A [`WindowGate`](crate::WindowGate) admits up to [`capacity`](Quota::capacity)
/// callers in every window of [`window`](Quota::window) length; the next
/// caller waits until the window is over.
///
/// Neither the capacity nor the window length may be zero.
///
/// # Examples
///
/// Construct a quota that admits 50 callers per second:
/// ```rust
/// # use window_gate::Quota;
/// # use nonzero_ext::nonzero;
/// # use std::time::Duration;
/// let q = Quota::per_second(nonzero!(50u32));
/// assert_eq!(q.capacity().get(), 50);
/// assert_eq!(q.window(), Duration::from_secs(1));
/// assert_eq!(q, Quota::new(50, Duration::from_secs(1)).unwrap());
/// ```
///
/// Invalid parameters are rejected when the quota is constructed:
/// ```rust
/// # use window_gate::{InvalidQuota, Quota};
/// # use std::time::Duration;
/// assert_eq!(Quota::new(0, Duration::from_secs(1)), Err(InvalidQuota::ZeroCapacity));
/// assert_eq!(Quota::new(10, Duration::ZERO), Err(InvalidQuota::ZeroWindow));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Quota {
    pub(crate) capacity: NonZeroU32,
    pub(crate) window: Duration,
}

/// Constructors for Quotas
impl Quota {
    /// Construct a quota admitting `capacity` callers per second.
    pub const fn per_second(capacity: NonZeroU32) -> Quota {
        Quota {
            capacity,
            window: Duration::from_secs(1),
        }
    }

    /// Construct a quota admitting `capacity` callers per 60-second window.
    pub const fn per_minute(capacity: NonZeroU32) -> Quota {
        Quota {
            capacity,
            window: Duration::from_secs(60),
        }
    }

    /// Construct a quota admitting `capacity` callers per 60-minute (3600-second) window.
    pub const fn per_hour(capacity: NonZeroU32) -> Quota {
        Quota {
            capacity,
            window: Duration::from_secs(60 * 60),
        }
    }

    /// Construct a quota admitting `capacity` callers per window of the given length.
    ///
    /// Returns [`InvalidQuota::ZeroWindow`] if the window is zero.
    pub fn with_window(capacity: NonZeroU32, window: Duration) -> Result<Quota, InvalidQuota> {
        if window.is_zero() {
            return Err(InvalidQuota::ZeroWindow);
        }
        Ok(Quota { capacity, window })
    }

    /// Construct a quota from plain parameters, validating both.
    pub fn new(capacity: u32, window: Duration) -> Result<Quota, InvalidQuota> {
        let capacity = NonZeroU32::new(capacity).ok_or(InvalidQuota::ZeroCapacity)?;
        Quota::with_window(capacity, window)
    }
}

/// Retrieving information about a quota
impl Quota {
    /// The maximum number of admissions per window.
    pub const fn capacity(&self) -> NonZeroU32 {
        self.capacity
    }

    /// The length of a window.
    pub const fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn time_multiples() {
        let hourly = Quota::per_hour(nz(1));
        let minutely = Quota::per_minute(nz(1));
        let secondly = Quota::per_second(nz(1));

        assert_eq!(hourly.window() / 60, minutely.window());
        assert_eq!(minutely.window() / 60, secondly.window());
    }

    #[test]
    fn validates_parameters() {
        assert_eq!(
            Err(InvalidQuota::ZeroCapacity),
            Quota::new(0, Duration::from_secs(1))
        );
        // capacity is checked first
        assert_eq!(Err(InvalidQuota::ZeroCapacity), Quota::new(0, Duration::ZERO));
        assert_eq!(Err(InvalidQuota::ZeroWindow), Quota::new(3, Duration::ZERO));
        assert_eq!(
            Err(InvalidQuota::ZeroWindow),
            Quota::with_window(nz(3), Duration::ZERO)
        );
        assert_eq!(
            Ok(Quota::per_minute(nz(7))),
            Quota::new(7, Duration::from_secs(60))
        );
    }

    #[test]
    fn accepts_sub_millisecond_windows() {
        let q = Quota::new(1, Duration::from_nanos(1)).unwrap();
        assert_eq!(Duration::from_nanos(1), q.window());
        assert_eq!(1, q.capacity().get());
    }
}
