#![cfg(unix)]

// This test uses getrusage, so can only be run on unix.
extern crate libc;

use futures::executor::block_on;
use nonzero_ext::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use window_gate::{clock::FakeRelativeClock, Admission, Quota, WindowGate};

fn resident_memory_size() -> i64 {
    let mut out: libc::rusage = unsafe { std::mem::zeroed() };
    assert!(unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut out) } == 0);
    out.ru_maxrss
}

const LEAK_TOLERANCE: i64 = 1024 * 1024 * 10;

struct LeakCheck {
    usage_before: i64,
    n_iter: usize,
}

impl Drop for LeakCheck {
    fn drop(&mut self) {
        let usage_after = resident_memory_size();
        assert!(
            usage_after <= self.usage_before + LEAK_TOLERANCE,
            "Plausible memory leak!\nAfter {} iterations, usage before: {}, usage after: {}",
            self.n_iter,
            self.usage_before,
            usage_after
        );
    }
}

impl LeakCheck {
    fn new(n_iter: usize) -> Self {
        LeakCheck {
            n_iter,
            usage_before: resident_memory_size(),
        }
    }
}

#[test]
fn memleak_immediate_admissions() {
    let gate = WindowGate::with_clock(
        Quota::per_second(nonzero!(1_000_000u32)),
        FakeRelativeClock::default(),
    );

    let leak_check = LeakCheck::new(500_000);

    for _i in 0..leak_check.n_iter {
        block_on(gate.until_admitted());
    }
}

#[test]
fn memleak_boundary_waits() {
    // With a 1ns window, advancing by 1ns lands each call exactly on the window's end:
    // it overflows, and its boundary timer is already due.
    let clock = FakeRelativeClock::default();
    let gate = WindowGate::with_clock(
        Quota::with_window(nonzero!(1u32), Duration::from_nanos(1)).unwrap(),
        clock.clone(),
    );
    block_on(gate.until_admitted());

    let leak_check = LeakCheck::new(200_000);
    for _i in 0..leak_check.n_iter {
        clock.advance(Duration::from_nanos(1));
        assert_eq!(Admission::AfterWait, block_on(gate.until_admitted()));
    }
    assert_eq!(0, clock.pending_timers());
}

#[test]
fn memleak_multithreaded() {
    let gate = Arc::new(WindowGate::with_clock(
        Quota::per_second(nonzero!(1_000_000u32)),
        FakeRelativeClock::default(),
    ));

    let leak_check = LeakCheck::new(500);

    let threads: Vec<_> = (0..leak_check.n_iter)
        .map(|_| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                for _i in 0..10 {
                    block_on(gate.until_admitted());
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
}
