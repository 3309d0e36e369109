#![forbid(unsafe_code)]

//! Change-notifying cell for the panel's discrete state.
//!
//! [`Observable`] holds a small `Copy` value that only its owner writes.
//! Hosts receive a [`StateWatch`], which reads the value and registers
//! listeners but cannot write. A listener stays registered for as long as
//! the [`Subscription`] returned for it is alive.
//!
//! # Invariants
//!
//! 1. The version counts value-changing writes; writing an equal value is
//!    ignored and notifies nobody.
//! 2. Listeners run in registration order and receive the written value.
//! 3. No borrow is held while listeners run, so a listener may read the
//!    watch or write the cell again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = dyn Fn(T);

struct Shared<T> {
    value: Cell<T>,
    version: Cell<u64>,
    listeners: RefCell<Vec<Weak<Listener<T>>>>,
}

/// Owner handle: reads, writes and notifies.
#[derive(Clone)]
pub struct Observable<T> {
    shared: Rc<Shared<T>>,
}

impl<T: Copy + fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.shared.value.get())
            .field("version", &self.shared.version.get())
            .finish()
    }
}

impl<T: Copy + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: Cell::new(initial),
                version: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.value.get()
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.version.get()
    }

    /// Write `next`. Returns `false`, without notifying, if it equals the
    /// current value.
    pub fn set(&self, next: T) -> bool {
        if self.shared.value.get() == next {
            return false;
        }
        self.shared.value.set(next);
        self.shared.version.set(self.shared.version.get() + 1);

        let live: Vec<Rc<Listener<T>>> = {
            let mut listeners = self.shared.listeners.borrow_mut();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener(next);
        }
        true
    }

    /// Register `listener` for future changes.
    pub fn subscribe(&self, listener: impl Fn(T) + 'static) -> Subscription {
        let strong: Rc<Listener<T>> = Rc::new(listener);
        self.shared
            .listeners
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription {
            _keepalive: Box::new(strong),
        }
    }

    /// Listeners whose subscription is still alive.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Read-only handle for hosts.
    #[must_use]
    pub fn watch(&self) -> StateWatch<T> {
        StateWatch {
            source: self.clone(),
        }
    }
}

/// Read-only view of an [`Observable`].
#[derive(Clone)]
pub struct StateWatch<T> {
    source: Observable<T>,
}

impl<T: Copy + fmt::Debug> fmt::Debug for StateWatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateWatch")
            .field(&self.source.shared.value.get())
            .finish()
    }
}

impl<T: Copy + PartialEq + 'static> StateWatch<T> {
    #[inline]
    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.source.version()
    }

    pub fn subscribe(&self, listener: impl Fn(T) + 'static) -> Subscription {
        self.source.subscribe(listener)
    }
}

/// Keeps a listener registered until dropped.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct Subscription {
    _keepalive: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
