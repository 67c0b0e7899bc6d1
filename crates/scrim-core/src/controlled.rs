#![forbid(unsafe_code)]

//! Controlled vs. uncontrolled values as an explicit tagged variant.
//!
//! Interactive components either own their value (uncontrolled) or mirror a
//! value owned by the application (controlled). Instead of guessing the mode
//! from which options were supplied, [`Controlled`] names it:
//!
//! - [`Controlled::Owned`]: the component stores the value and changes it
//!   directly.
//! - [`Controlled::External`]: the application stores the value. The
//!   component reports requested changes through `on_change` and keeps
//!   showing the old value until the owner writes a new one.
//!
//! # Invariants
//!
//! 1. [`Controlled::request`] never mutates an `External` value.
//! 2. [`Controlled::set`] (owner write) is accepted in both modes.
//! 3. `on_change` fires only for requests that differ from the current value.

/// Change callback for externally owned values.
pub type OnChange<T> = Box<dyn FnMut(&T)>;

/// A value that is either owned by the component or by its caller.
pub enum Controlled<T> {
    /// Uncontrolled: the component holds the value.
    Owned(T),
    /// Controlled: the caller holds the value and is told about requests.
    External { value: T, on_change: OnChange<T> },
}

impl<T: std::fmt::Debug> std::fmt::Debug for Controlled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owned(value) => f.debug_tuple("Owned").field(value).finish(),
            Self::External { value, .. } => f
                .debug_struct("External")
                .field("value", value)
                .finish_non_exhaustive(),
        }
    }
}

impl<T: PartialEq> Controlled<T> {
    /// An uncontrolled value with an initial state.
    pub fn owned(initial: T) -> Self {
        Self::Owned(initial)
    }

    /// A controlled value reporting requests to `on_change`.
    pub fn external(value: T, on_change: impl FnMut(&T) + 'static) -> Self {
        Self::External {
            value,
            on_change: Box::new(on_change),
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        match self {
            Self::Owned(value) | Self::External { value, .. } => value,
        }
    }

    /// Whether the caller owns the value.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External { .. })
    }

    /// Owner-side write (a new prop value, or an imperative set).
    ///
    /// Returns `true` if the stored value changed.
    pub fn set(&mut self, next: T) -> bool {
        let slot = match self {
            Self::Owned(value) | Self::External { value, .. } => value,
        };
        if *slot == next {
            return false;
        }
        *slot = next;
        true
    }

    /// Component-side change request.
    ///
    /// `Owned` stores the value. `External` forwards it to `on_change` and
    /// leaves the stored value alone. Returns `true` only if the stored
    /// value changed.
    pub fn request(&mut self, next: T) -> bool {
        match self {
            Self::Owned(value) => {
                if *value == next {
                    return false;
                }
                *value = next;
                true
            }
            Self::External { value, on_change } => {
                if *value != next {
                    on_change(&next);
                }
                false
            }
        }
    }
}
