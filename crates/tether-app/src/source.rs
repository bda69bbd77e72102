//! Event-source adaptation.
//!
//! Native push-style listener registration (add/remove listener) is
//! re-expressed as an owned, cancellable [`Subscription`] feeding an
//! unbounded, order-preserving queue. One dedicated listener loop per source
//! pulls from its queue until the source closes or the loop is dropped, so
//! events from a single source are always processed in emission order.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

/// Failure to register a listener with an external event source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("subscription failed: {reason}")]
pub struct SourceError {
    /// What the source reported.
    pub reason: String,
}

impl SourceError {
    /// Create a source error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Owned, cancellable subscription to a push-style event source.
///
/// Dropping the subscription releases the underlying listener registration.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> Subscription<T> {
    /// Wrap a queue receiver with a cleanup hook run on drop.
    ///
    /// The hook should remove the native listener that feeds the queue.
    pub fn with_guard(
        rx: mpsc::UnboundedReceiver<T>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self { rx, unsubscribe: Some(Box::new(unsubscribe)) }
    }

    /// Wrap a queue receiver whose sender side is the only registration.
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx, unsubscribe: None }
    }

    /// Next event in emission order. `None` once the source closes.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Create a connected sender/subscription pair for in-process sources.
pub fn subscription_pair<T>() -> (mpsc::UnboundedSender<T>, Subscription<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Subscription::from_receiver(rx))
}

/// A push-based external event source adapted to awaitable subscriptions.
///
/// Implementations wrap the host platform's listener API (app state,
/// network reachability) or a test double.
pub trait EventSource<T>: Send + Sync {
    /// Register a listener and return its event queue.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the underlying registration fails; the
    /// caller logs it and gives up on this source.
    fn subscribe(&self) -> Result<Subscription<T>, SourceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let (tx, mut sub) = subscription_pair();
        for n in 0..5 {
            tx.send(n).expect("queue should accept events");
        }
        for n in 0..5 {
            assert_eq!(sub.recv().await, Some(n));
        }
    }

    #[tokio::test]
    async fn recv_returns_none_after_source_closes() {
        let (tx, mut sub) = subscription_pair::<u8>();
        drop(tx);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn dropping_subscription_runs_unsubscribe_guard() {
        let released = Arc::new(AtomicBool::new(false));
        let (_tx, rx) = mpsc::unbounded_channel::<u8>();
        let flag = Arc::clone(&released);
        let sub = Subscription::with_guard(rx, move || flag.store(true, Ordering::SeqCst));

        assert!(!released.load(Ordering::SeqCst));
        drop(sub);
        assert!(released.load(Ordering::SeqCst));
    }
}
