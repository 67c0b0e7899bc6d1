#![forbid(unsafe_code)]

//! Input and lifecycle events delivered by the host.
//!
//! Events are host-agnostic: a DOM binding translates `keydown`, `click`
//! and `animationend` into these types, a terminal host translates its own
//! input stream. Pointer events carry the element they were dispatched to
//! (the DOM `event.target`) rather than coordinates; hit testing is the
//! host's job.

use bitflags::bitflags;

use crate::element::ElementId;

/// A host event routed through the overlay layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keyboard input.
    Key(KeyEvent),
    /// Pointer input.
    Mouse(MouseEvent),
    /// An animation finished on some element.
    AnimationEnd(AnimationEvent),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Active modifiers.
    pub modifiers: Modifiers,
    /// Press, repeat or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is a press (or auto-repeat) rather than a release.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Whether this event moves focus forward (plain Tab).
    #[must_use]
    pub fn is_tab(&self) -> bool {
        self.code == KeyCode::Tab && !self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Whether this event moves focus backward (Shift+Tab or BackTab).
    #[must_use]
    pub fn is_back_tab(&self) -> bool {
        self.code == KeyCode::BackTab
            || (self.code == KeyCode::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }
}

/// Key codes the overlay layer cares about, plus a catch-all for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    /// Shift+Tab as reported by hosts that fold the modifier into the key.
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    F(u8),
}

/// Key event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Keyboard modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT = 0b0010;
        const CTRL = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Mouse event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    /// A completed click (press and release on the same element).
    Click(MouseButton),
}

/// A pointer event dispatched to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Event kind.
    pub kind: MouseEventKind,
    /// The innermost element the pointer hit (DOM `event.target`).
    pub target: ElementId,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, target: ElementId) -> Self {
        Self { kind, target }
    }

    /// A primary-button click on `target`.
    #[must_use]
    pub const fn click(target: ElementId) -> Self {
        Self::new(MouseEventKind::Click(MouseButton::Left), target)
    }

    /// Whether this is a primary-button click.
    #[must_use]
    pub const fn is_primary_click(&self) -> bool {
        matches!(self.kind, MouseEventKind::Click(MouseButton::Left))
    }
}

/// An animation-end notification.
///
/// Hosts bubble these like any other event, so `target` may be a
/// descendant of the element that owns the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEvent {
    /// Element whose animation finished.
    pub target: ElementId,
}

impl AnimationEvent {
    #[must_use]
    pub const fn new(target: ElementId) -> Self {
        Self { target }
    }
}
