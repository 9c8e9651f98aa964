//! # window-gate - a fixed-window admission gate
//!
//! This library provides a [`WindowGate`]: an asynchronous gate that lets
//! up to a fixed number of callers through per window of time, and makes
//! every caller beyond that quota wait until the window has rolled over.
//!
//! Windows have fixed boundaries and reset in bulk: the first caller
//! after a window has ended opens the next one. This is neither a
//! sliding-window nor a token-bucket limiter, and it only coordinates
//! callers within a single process.
//!
//! # Quick example
//!
//! Let's admit at most 2 callers per second, and see the third wait:
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use std::time::Duration;
//! use window_gate::{clock::FakeRelativeClock, Admission, Quota, WindowGate};
//! use nonzero_ext::*;
//! use futures::task::LocalSpawnExt;
//!
//! let clock = FakeRelativeClock::default();
//! let gate = std::rc::Rc::new(WindowGate::with_clock(
//!     Quota::per_second(nonzero!(2u32)),
//!     clock.clone(),
//! ));
//! assert_eq!(Admission::Immediate, block_on(gate.until_admitted()));
//! assert_eq!(Admission::Immediate, block_on(gate.until_admitted()));
//!
//! let mut pool = futures::executor::LocalPool::new();
//! let third = pool
//!     .spawner()
//!     .spawn_local_with_handle({
//!         let gate = gate.clone();
//!         async move { gate.until_admitted().await }
//!     })
//!     .unwrap();
//! pool.run_until_stalled();
//!
//! // The third caller is parked until the window is over:
//! clock.advance(Duration::from_secs(1));
//! assert_eq!(Admission::AfterWait, pool.run_until(third));
//! ```
//!
//! For a more in-depth guide, see the [`_guide`] module.

#![deny(missing_docs)]

pub mod _guide;
pub mod clock;
mod errors;
mod gate;
mod nanos;
mod quota;

pub use errors::*;
pub use gate::{Admission, GatedStream, StreamGateExt, WindowGate, WindowSnapshot};
pub use quota::Quota;

/// Re-exported so callers can hand a cancellation token to
/// [`WindowGate::admit`] without depending on `tokio-util` themselves.
pub use tokio_util::sync::CancellationToken;

/// The collection of asynchronous traits exported from this crate.
pub mod prelude {
    pub use crate::gate::StreamGateExt;
}
