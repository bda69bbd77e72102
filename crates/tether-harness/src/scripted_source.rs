//! Scripted event sources.
//!
//! [`ScriptedSource`] implements [`EventSource`] with a test-side emit
//! handle, so lifecycle and connectivity transitions can be injected in an
//! exact order. Subscription registration can be forced to fail to exercise
//! listener-error paths.

use std::sync::{Arc, Mutex, MutexGuard};

use tether_app::{EventSource, SourceError, Subscription};
use tokio::sync::mpsc;

struct SourceState<T> {
    listeners: Vec<mpsc::UnboundedSender<T>>,
    refuse_subscriptions: bool,
    unsubscribes: usize,
}

impl<T> Default for SourceState<T> {
    fn default() -> Self {
        Self { listeners: Vec::new(), refuse_subscriptions: false, unsubscribes: 0 }
    }
}

/// Test-controlled push-style event source.
pub struct ScriptedSource<T> {
    state: Arc<Mutex<SourceState<T>>>,
}

impl<T> Clone for ScriptedSource<T> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state) }
    }
}

impl<T> Default for ScriptedSource<T> {
    fn default() -> Self {
        Self { state: Arc::default() }
    }
}

impl<T> ScriptedSource<T> {
    /// Create a source with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, SourceState<T>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Push one event to every live listener, in emission order.
    pub fn emit(&self, event: T)
    where
        T: Clone,
    {
        self.locked().listeners.retain(|listener| listener.send(event.clone()).is_ok());
    }

    /// Make all future subscription attempts fail.
    pub fn refuse_subscriptions(&self) {
        self.locked().refuse_subscriptions = true;
    }

    /// How many subscriptions have been released (dropped).
    pub fn unsubscribe_count(&self) -> usize {
        self.locked().unsubscribes
    }

    /// How many listeners have registered so far.
    pub fn listener_count(&self) -> usize {
        self.locked().listeners.len()
    }
}

impl<T> EventSource<T> for ScriptedSource<T>
where
    T: Send + 'static,
{
    fn subscribe(&self) -> Result<Subscription<T>, SourceError> {
        let mut state = self.locked();
        if state.refuse_subscriptions {
            return Err(SourceError::new("scripted registration failure"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.listeners.push(tx);

        let source = Arc::clone(&self.state);
        Ok(Subscription::with_guard(rx, move || {
            if let Ok(mut state) = source.lock() {
                state.unsubscribes += 1;
            }
        }))
    }
}
