use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A number of nanoseconds from a reference point.
///
/// This is the instant type of the [`FakeRelativeClock`](crate::clock::FakeRelativeClock).
/// Can not represent durations >584 years, but hopefully that
/// should not be a problem in real-world applications.
#[derive(PartialEq, Eq, Default, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct Nanos(u64);

impl Nanos {
    /// Returns the number of nanoseconds since the reference point.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub(crate) fn saturating_sub(self, rhs: Nanos) -> Nanos {
        Nanos(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Debug for Nanos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = Duration::from_nanos(self.0);
        write!(f, "Nanos({:?})", d)
    }
}

impl From<u64> for Nanos {
    fn from(u: u64) -> Self {
        Nanos(u)
    }
}

impl From<Nanos> for u64 {
    fn from(n: Nanos) -> Self {
        n.0
    }
}

impl From<Duration> for Nanos {
    fn from(d: Duration) -> Self {
        // Saturates at ~584 years.
        Nanos(d.as_nanos().try_into().unwrap_or(u64::MAX))
    }
}

impl From<Nanos> for Duration {
    fn from(n: Nanos) -> Self {
        Duration::from_nanos(n.0)
    }
}

impl Add<Nanos> for Nanos {
    type Output = Nanos;

    fn add(self, rhs: Nanos) -> Nanos {
        Nanos(self.0.saturating_add(rhs.0))
    }
}

impl Add<Duration> for Nanos {
    type Output = Nanos;

    fn add(self, rhs: Duration) -> Nanos {
        self + Nanos::from(rhs)
    }
}

impl Sub<Nanos> for Nanos {
    type Output = Nanos;

    fn sub(self, rhs: Nanos) -> Nanos {
        self.saturating_sub(rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nanos_arith_saturates() {
        let one = Nanos::from(1);
        assert_eq!(Nanos::default(), Nanos::default() - one);
        assert_eq!(Nanos::from(u64::MAX), Nanos::from(u64::MAX) + one);
        assert_eq!(
            Nanos::from(u64::MAX),
            Nanos::default() + Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn nanos_impls() {
        let n = Nanos::from(Duration::from_millis(3));
        assert_eq!(3_000_000, n.as_u64());
        assert_eq!(Duration::from_millis(3), Duration::from(n));
        assert!(format!("{:?}", n).contains("3ms"));
    }
}
