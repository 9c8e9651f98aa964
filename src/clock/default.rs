#[cfg(feature = "quanta")]
/// The default clock using [`quanta`] for extremely fast timekeeping (at a 1ns resolution).
pub type DefaultClock = super::QuantaClock;

#[cfg(not(feature = "quanta"))]
/// The default clock that reports [`Instant`][std::time::Instant]s.
pub type DefaultClock = super::MonotonicClock;
