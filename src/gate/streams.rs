use std::pin::Pin;

use futures::future::{BoxFuture, FutureExt};
use futures::task::{Context, Poll};
use futures::Stream;

use super::{Admission, WindowGate};
use crate::clock::Scheduler;

/// Passes the items of a stream through a [`WindowGate`].
pub trait StreamGateExt<'a, C: Scheduler>: Stream {
    /// Lets each item of the stream through only once `gate` admits it.
    ///
    /// Note that this combinator limits the rate at which it yields
    /// items, not necessarily the rate at which the underlying stream is polled.
    /// The combinator will buffer at most one item while it waits for
    /// admission, and will not `poll` the underlying stream during that time.
    fn gated(self, gate: &'a WindowGate<C>) -> GatedStream<'a, Self, C>
    where
        Self: Sized;
}

impl<'a, C: Scheduler, S: Stream> StreamGateExt<'a, C> for S {
    fn gated(self, gate: &'a WindowGate<C>) -> GatedStream<'a, Self, C>
    where
        Self: Sized,
    {
        GatedStream {
            inner: self,
            gate,
            buf: None,
            admission: None,
        }
    }
}

/// A stream combinator which lets items through a [`WindowGate`].
///
/// This is produced by the [`StreamGateExt::gated`] method.
pub struct GatedStream<'a, S: Stream, C: Scheduler> {
    inner: S,
    gate: &'a WindowGate<C>,
    buf: Option<S::Item>,
    admission: Option<BoxFuture<'a, Admission>>,
}

/// Conversion methods for the stream combinator.
impl<'a, S: Stream, C: Scheduler> GatedStream<'a, S, C> {
    /// Acquires a reference to the underlying stream that this combinator is pulling from.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Acquires a mutable reference to the underlying stream that this combinator is pulling from.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this combinator, returning the underlying stream and any item
    /// which it has already produced but which is still waiting for admission.
    ///
    /// A pending admission is abandoned.
    pub fn into_inner(self) -> (S, Option<S::Item>) {
        (self.inner, self.buf)
    }
}

/// Implements the [`futures::Stream`] combinator.
impl<'a, S: Stream, C: Scheduler> Stream for GatedStream<'a, S, C>
where
    S: Unpin,
    S::Item: Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(admission) = this.admission.as_mut() {
                match admission.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(_) => {
                        this.admission = None;
                        return Poll::Ready(this.buf.take());
                    }
                }
            }
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Ready(Some(item)) => {
                    this.buf = Some(item);
                    this.admission = Some(this.gate.until_admitted().boxed());
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = usize::from(self.buf.is_some());
        let (lower, upper) = self.inner.size_hint();
        (
            lower.saturating_add(buffered),
            upper.and_then(|u| u.checked_add(buffered)),
        )
    }
}
