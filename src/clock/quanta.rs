use super::with_std::spawn_timer;
use super::{Callback, Clock, Reference, Scheduler};
use std::time::Duration;

/// A clock using the default [`quanta::Clock`] structure.
///
/// This clock uses [`quanta::Clock.now`], which does retrieve the time synchronously.
/// Boundary timers wait on the shared timer pool and re-read this clock when they fire.
#[derive(Debug, Clone, Default)]
pub struct QuantaClock(quanta::Clock);

impl Reference for quanta::Instant {
    fn duration_since(&self, earlier: Self) -> Duration {
        self.saturating_duration_since(earlier)
    }
}

impl Clock for QuantaClock {
    type Instant = quanta::Instant;

    fn now(&self) -> Self::Instant {
        self.0.now()
    }
}

impl Scheduler for QuantaClock {
    fn schedule_at(&self, at: quanta::Instant, callback: Callback<quanta::Instant>) {
        let clock = self.0.clone();
        let delay = at.saturating_duration_since(clock.now());
        spawn_timer(delay, move || callback(clock.now().max(at)));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn quanta_impls_coverage() {
        let one_ns = Duration::from_nanos(1);
        let c = QuantaClock::default();
        let now = c.now();
        assert_eq!(Reference::duration_since(&(now + one_ns), now), one_ns);
        assert_eq!(Reference::duration_since(&now, now + one_ns), Duration::ZERO);
        assert!(!format!("{:?}", c).is_empty());
    }

    #[test]
    fn quanta_clock_fires_after_instant() {
        let c = QuantaClock::default();
        let at = c.now() + Duration::from_millis(10);
        let (tx, rx) = mpsc::channel();
        c.schedule_at(
            at,
            Box::new(move |fired| {
                tx.send(fired).unwrap();
            }),
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap() >= at);
    }
}
