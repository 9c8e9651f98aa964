//! # A more in-depth guide to `window-gate`
//!
//! # Constructing a gate
//!
//! Each gate has a quota: a number of admissions per window of time.
//! Construction of gates is designed to be mostly infallible, given
//! correctly-constructed parameters. To that end, the fixed-interval
//! constructors take a [`NonZeroU32`][std::num::NonZeroU32]; to
//! conveniently construct these nonzero numbers, use the `nonzero!`
//! macro of the `nonzero_ext` crate.
//!
//! ```rust
//! # use nonzero_ext::*;
//! use window_gate::{Quota, WindowGate};
//! let gate = WindowGate::new(Quota::per_second(nonzero!(20u32)));
//! ```
//!
//! Windows of arbitrary length, and parameters that are only known at
//! runtime, go through the validating constructors; zero capacities and
//! zero-length windows are rejected before a gate ever exists:
//!
//! ```rust
//! # use std::time::Duration;
//! use window_gate::{InvalidQuota, WindowGate};
//! assert!(WindowGate::try_new(5, Duration::from_millis(250)).is_ok());
//! assert_eq!(
//!     InvalidQuota::ZeroCapacity,
//!     WindowGate::try_new(0, Duration::from_millis(250)).unwrap_err()
//! );
//! ```
//!
//! # Clocks
//!
//! A gate reads the current time from its clock, and asks the clock to
//! wake up a waiting caller once the window is over. Both capabilities
//! are described by the [`Scheduler`][crate::clock::Scheduler] trait.
//! The default clock is real time; in tests, a
//! [`FakeRelativeClock`][crate::clock::FakeRelativeClock] only moves
//! when it is [advanced][crate::clock::FakeRelativeClock::advance], and
//! fires due timers synchronously as it goes.
//!
//! # Waiting and cancellation
//!
//! Callers pass through the gate one at a time, first come first served.
//! A caller that exceeds the quota keeps its place while it waits for
//! the window to end; everybody else queues behind it. This makes the
//! gate a single serialization point: there is never more than one
//! caller waiting on a window boundary.
//!
//! Waits can be abandoned with a
//! [`CancellationToken`][crate::CancellationToken]:
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use nonzero_ext::*;
//! use window_gate::{clock::FakeRelativeClock, Cancelled, CancellationToken, Quota, WindowGate};
//!
//! let gate = WindowGate::with_clock(
//!     Quota::per_hour(nonzero!(1u32)),
//!     FakeRelativeClock::default(),
//! );
//! let token = CancellationToken::new();
//! block_on(gate.admit(&token)).unwrap();
//!
//! // The next caller would wait for an hour; give up instead.
//! token.cancel();
//! assert_eq!(Err(Cancelled), block_on(gate.admit(&token)));
//! ```
//!
//! Dropping the future returned by
//! [`until_admitted`][crate::WindowGate::until_admitted] abandons the
//! wait in the same way.
//!
//! # Usage in multiple threads
//!
//! Gates are `Send` and `Sync`, and can not be cloned: share them
//! behind an [`Arc`][std::sync::Arc] instead.
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use nonzero_ext::*;
//! # use std::sync::Arc;
//! # use std::thread;
//! use window_gate::{Quota, WindowGate};
//!
//! let gate = Arc::new(WindowGate::new(Quota::per_second(nonzero!(50u32))));
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let gate = Arc::clone(&gate);
//!         thread::spawn(move || block_on(gate.until_admitted()))
//!     })
//!     .collect();
//! for handle in handles {
//!     assert!(!handle.join().unwrap().waited());
//! }
//! ```
//!
//! # Gating streams
//!
//! The [`StreamGateExt`][crate::StreamGateExt] extension trait lets
//! each item of a [`Stream`][futures::Stream] through only once the
//! gate admits it.
