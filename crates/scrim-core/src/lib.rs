#![forbid(unsafe_code)]

//! Host abstraction for scrim.
//!
//! - [`event`]: keyboard, pointer and animation-end events.
//! - [`document`]: the [`Document`] trait overlays drive.
//! - [`element`]: element handles and the in-memory [`ElementTree`].
//! - [`listener`]: listener registry with RAII [`Subscription`]s.
//! - [`controlled`]: the [`Controlled`] owned/external value variant.

pub mod controlled;
pub mod document;
pub mod element;
pub mod event;
pub mod listener;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use controlled::Controlled;
pub use document::{Document, DocumentError};
pub use element::{Element, ElementId, ElementKind, ElementTree};
pub use event::{
    AnimationEvent, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
pub use listener::{ListenerKind, ListenerRegistry, ListenerTarget, Subscription};
