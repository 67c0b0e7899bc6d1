#![forbid(unsafe_code)]

//! Reference-counted page scroll lock.
//!
//! Every rendered overlay holds one [`ScrollLockGuard`]. The page is locked
//! while at least one guard is alive, so closing one of two stacked overlays
//! leaves scrolling suppressed until the other closes too.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Balanced** - each `acquire` is matched by exactly one release, when
//!    its guard drops.
//! 2. **No leaked locks** - a guard dropped on any path (explicit close,
//!    unmount, owner dropped mid-animation) releases its count.
//! 3. **Edge-only host writes** - [`ScrollLock::sync`] touches the document
//!    only when the locked/unlocked state differs from what it last applied.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use scrim_core::document::Document;

/// Shared scroll lock counter.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    holders: Rc<Cell<usize>>,
}

impl ScrollLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a hold on the lock.
    #[must_use = "the lock is released as soon as the guard drops"]
    pub fn acquire(&self) -> ScrollLockGuard {
        self.holders.set(self.holders.get() + 1);
        ScrollLockGuard {
            holders: Rc::downgrade(&self.holders),
        }
    }

    /// Number of live guards.
    #[must_use]
    pub fn holders(&self) -> usize {
        self.holders.get()
    }

    /// Whether any guard is alive.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders.get() > 0
    }

    /// Mirror the lock state onto the document.
    ///
    /// Returns `true` if the document flag changed.
    pub fn sync<D: Document + ?Sized>(&self, doc: &mut D) -> bool {
        let locked = self.is_locked();
        if doc.is_scroll_locked() == locked {
            return false;
        }
        tracing::debug!(target: "scrim::overlay", locked, holders = self.holders(), "scroll lock");
        doc.set_scroll_locked(locked);
        true
    }
}

/// RAII hold on a [`ScrollLock`].
#[derive(Debug)]
pub struct ScrollLockGuard {
    holders: Weak<Cell<usize>>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        if let Some(holders) = self.holders.upgrade() {
            holders.set(holders.get().saturating_sub(1));
        }
    }
}
