#![forbid(unsafe_code)]

//! Overlay lifecycle phases.
//!
//! ```text
//!            open                entry done            close
//!  Closed ─────────▶ Opening ─────────────▶ Open ─────────────▶ Closing
//!    ▲                  │                                          │
//!    │                  └──────────────── close ───────────────────┤
//!    └──────────────────────────── exit done ──────────────────────┘
//! ```
//!
//! `phase` lags `requested_open`: after the owner sets `open = false` the
//! overlay stays rendered in `Closing` until its exit animation completes.

/// Where an overlay is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayPhase {
    /// Not rendered.
    #[default]
    Closed,
    /// Rendered, entry animation running.
    Opening,
    /// Rendered and settled.
    Open,
    /// Rendered, exit animation running.
    Closing,
}

impl OverlayPhase {
    /// Whether the overlay subtree is mounted in this phase.
    #[inline]
    #[must_use]
    pub const fn is_rendered(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether dismissal and focus-trap listeners are live in this phase.
    #[inline]
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }

    /// Whether `self -> next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Closed, Self::Opening)
                | (Self::Opening, Self::Open)
                | (Self::Opening, Self::Closing)
                | (Self::Open, Self::Closing)
                | (Self::Closing, Self::Closed)
        )
    }

    /// Short lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

impl std::fmt::Display for OverlayPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase plus the owner's most recent `open` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub phase: OverlayPhase,
    pub requested_open: bool,
}

/// A phase transition that just happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: OverlayPhase,
    pub to: OverlayPhase,
}
