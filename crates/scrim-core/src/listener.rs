#![forbid(unsafe_code)]

//! Document listener registry with RAII subscriptions.
//!
//! Overlays listen to the document (keydown) and to individual elements
//! (backdrop click) only while they are live. Every registration returns a
//! [`Subscription`]; dropping it removes the entry before the next dispatch.
//! There is no other way to unregister, so a listener can't outlive the
//! owner that holds its subscription.
//!
//! # Invariants
//!
//! 1. `owners(...)` reports entries in registration order.
//! 2. Dropping a `Subscription` removes exactly its own entry.
//! 3. A `Subscription` outliving its registry is inert on drop.
//!
//! `ListenerRegistry` is `Rc`-backed: it is a single-threaded UI structure.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::element::ElementId;

/// Event type a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    KeyDown,
    Click,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// The document itself; receives every event of its kind.
    Document,
    /// A single element; receives events whose bubble path crosses it.
    Element(ElementId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: u64,
    kind: ListenerKind,
    target: ListenerTarget,
    owner: u64,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Shared registry of live listeners.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on behalf of `owner`.
    #[must_use = "dropping the subscription unregisters the listener immediately"]
    pub fn register(&self, kind: ListenerKind, target: ListenerTarget, owner: u64) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            kind,
            target,
            owner,
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Total number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Owners listening for `kind` on `target`, in registration order.
    #[must_use]
    pub fn owners(&self, kind: ListenerKind, target: ListenerTarget) -> Vec<u64> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind == kind && e.target == target)
            .map(|e| e.owner)
            .collect()
    }

    /// Whether `owner` has a listener for `kind` anywhere.
    #[must_use]
    pub fn is_listening(&self, owner: u64, kind: ListenerKind) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|e| e.owner == owner && e.kind == kind)
    }

    /// Number of listeners held by `owner`.
    #[must_use]
    pub fn count_for(&self, owner: u64) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .count()
    }
}

/// RAII guard for a registered listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Inner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.borrow_mut().entries.retain(|e| e.id != self.id);
        }
    }
}
