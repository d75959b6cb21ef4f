//! # Async bridge: push stream → `futures::Stream`.
//!
//! Proxy outputs are push-based; async consumers usually want to `.await`
//! values. [`Stream::into_async`] registers an observer that forwards every
//! value into an unbounded `futures::channel::mpsc` queue and returns the
//! receiving end.
//!
//! ## Rules
//! - The queue is unbounded: the push side never blocks or drops.
//! - `on_complete` closes the channel, ending the async stream.
//! - Dropping the receiver stops buffering but does not dispose the
//!   subscription; dispose the returned [`Subscription`] to detach.

use std::sync::Arc;

use futures::channel::mpsc;

use super::observable::{Observer, Stream};
use super::subscription::Subscription;

struct Forward<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send> Observer<T> for Forward<T> {
    fn on_next(&self, value: T) {
        // Receiver gone: nothing left to deliver to.
        let _ = self.tx.unbounded_send(value);
    }

    fn on_complete(&self) {
        self.tx.close_channel();
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Subscribes and exposes the values as an async stream.
    pub fn into_async(&self) -> (Subscription, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded();
        let sub = self.subscribe(Arc::new(Forward { tx }));
        (sub, rx)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::stream::{Stream, Subject};

    #[tokio::test]
    async fn test_values_arrive_in_order() {
        let subject = Subject::new();
        let (_sub, mut rx) = subject.stream().into_async();

        subject.next(1u32);
        subject.next(2);

        assert_eq!(rx.next().await, Some(1));
        assert_eq!(rx.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_completion_ends_stream() {
        let (_sub, rx) = Stream::of(vec!['x', 'y']).into_async();
        let all: Vec<char> = rx.collect().await;
        assert_eq!(all, vec!['x', 'y']);
    }
}
