//! Blocking iterator over state changes
//!
//! Provides various iteration patterns for consuming change events:
//! - Blocking: `recv()`, `for change in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::event::StateChange;

/// Blocking iterator over state changes of one receiver
///
/// Each call to `StateStore::subscribe()` creates its own channel, so every
/// subscriber sees every change. Clones share that channel.
///
/// # Example
///
/// ```rust,ignore
/// for change in receiver.subscribe() {
///     println!("{:?} is now {:?} ({:?})", change.field, change.value, change.origin);
/// }
/// ```
#[derive(Clone)]
pub struct ChangeIterator {
    rx: Arc<Mutex<mpsc::Receiver<StateChange>>>,
}

impl ChangeIterator {
    pub(crate) fn new(rx: mpsc::Receiver<StateChange>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Block until the next change is available
    ///
    /// Returns `None` if the store has been dropped.
    pub fn recv(&self) -> Option<StateChange> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Block until the next change or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StateChange> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Try to receive a change without blocking
    pub fn try_recv(&self) -> Option<StateChange> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Non-blocking iterator over currently queued changes
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }

    /// Blocking iterator that stops after `timeout` without a change
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl Iterator for ChangeIterator {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently available changes
pub struct TryIter<'a> {
    inner: &'a ChangeIterator,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a> {
    inner: &'a ChangeIterator,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIter<'a> {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}
