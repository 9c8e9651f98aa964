//! The bookkeeping of a single fixed window, independent of clocks and locks.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::clock::Reference;

/// A point-in-time view of a gate's current window.
///
/// A window covers the instants from [`start`](WindowSnapshot::start) up to
/// and including [`end`](WindowSnapshot::end); the first instant strictly
/// after `end` belongs to the next window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot<P> {
    start: P,
    end: P,
    count: u32,
}

impl<P: Reference> WindowSnapshot<P> {
    fn open(start: P, length: Duration) -> Self {
        WindowSnapshot {
            start,
            end: start + length,
            count: 1,
        }
    }

    /// The instant at which the window was opened.
    pub fn start(&self) -> P {
        self.start
    }

    /// The last instant that still belongs to the window.
    pub fn end(&self) -> P {
        self.end
    }

    /// The number of admissions counted against this window so far. This
    /// includes a caller that is currently waiting for the window to end.
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// What a caller entering the gate has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision<P> {
    /// A fresh window was opened for this caller.
    Opened,

    /// The caller fits into the current window's quota.
    Within { count: u32 },

    /// The quota is exhausted; the caller must wait until `boundary` has passed.
    Overflow { boundary: P },
}

#[derive(Debug)]
pub(crate) struct WindowState<P> {
    current: Option<WindowSnapshot<P>>,
}

impl<P> Default for WindowState<P> {
    fn default() -> Self {
        WindowState { current: None }
    }
}

impl<P: Reference> WindowState<P> {
    /// Counts a caller arriving at `now` against the current window,
    /// opening a fresh one if there is none or the current one is stale.
    pub(crate) fn enter(&mut self, now: P, capacity: NonZeroU32, length: Duration) -> Decision<P> {
        match &mut self.current {
            Some(window) if now <= window.end => {
                window.count = window.count.saturating_add(1);
                if window.count <= capacity.get() {
                    Decision::Within {
                        count: window.count,
                    }
                } else {
                    Decision::Overflow {
                        boundary: window.end,
                    }
                }
            }
            _ => {
                self.current = Some(WindowSnapshot::open(now, length));
                Decision::Opened
            }
        }
    }

    /// Rolls the window ending at `boundary` over at `fired_at`, counting the
    /// waiter that scheduled the boundary timer as the new window's first
    /// admission.
    ///
    /// If the window was already replaced by a newer one, that window stays
    /// and the waiter is counted against it instead. Returns whether a fresh
    /// window was opened.
    pub(crate) fn roll_over(&mut self, boundary: P, fired_at: P, length: Duration) -> bool {
        match &mut self.current {
            Some(window) if window.end != boundary => {
                window.count = window.count.saturating_add(1);
                false
            }
            _ => {
                self.current = Some(WindowSnapshot::open(fired_at, length));
                true
            }
        }
    }

    pub(crate) fn current(&self) -> Option<WindowSnapshot<P>> {
        self.current
    }
}
