#![forbid(unsafe_code)]

//! Single-slot broadcast mailbox with change notification.
//!
//! # Design
//!
//! [`Signal<T>`] holds the latest value of some stream (the active step name,
//! the ready target) in shared, reference-counted storage. Publishing
//! replaces the value and notifies every live subscriber in registration
//! order. New subscribers receive the current value immediately, so a
//! collaborator that attaches late still sees the present state.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per delivered value.
//! 2. Subscribers are notified in registration order.
//! 3. [`Signal::subscribe`] replays the current value before returning.
//! 4. A dropped [`Subscription`] is never called again.
//!
//! # Failure Modes
//!
//! - **Publish from a subscriber**: allowed. Callbacks run outside the
//!   borrow, so a nested publish notifies everyone with the newer value
//!   before the outer loop continues with it.
//! - **Subscriber leak**: dead entries are pruned lazily on the next publish.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct SignalInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared latest-value stream.
///
/// Cloning a `Signal` creates a new handle to the **same** slot. Readers get
/// snapshots (clones); only the owning component should publish.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a signal holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers, even if it is unchanged.
    pub fn publish(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Subscribe and immediately receive the current value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let value = self.get();
        callback(&value);
        self.subscribe_changes(callback)
    }

    /// Subscribe to future values only.
    pub fn subscribe_changes(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of delivered values since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };

        let value = self.get();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Publish only if `value` differs from the current one.
    ///
    /// Returns whether subscribers were notified.
    pub fn set(&self, value: T) -> bool {
        if self.inner.borrow().value == value {
            return false;
        }
        self.publish(value);
        true
    }
}

/// RAII guard for a signal subscriber.
///
/// Dropping the guard (or calling [`unsubscribe`](Self::unsubscribe))
/// releases the only strong reference to the callback.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Stop receiving values.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
