#![forbid(unsafe_code)]

//! Animation timing and the fallback deadline.
//!
//! Phase changes out of `Opening` and `Closing` are normally driven by the
//! host's animation-end event. If that event never arrives (reduced motion
//! removed the animation, the host dropped it, the element was restyled), a
//! deadline armed at transition time lets [`tick`] finalize the phase
//! anyway.
//!
//! The deadline is `fallback_factor × duration` after the transition, where
//! `duration` is the declared animation length (zero under reduced motion).
//!
//! [`tick`]: crate::OverlayStack::tick

use std::time::Duration;
use web_time::Instant;

/// Default entry animation length.
pub const DEFAULT_ENTER: Duration = Duration::from_millis(225);
/// Default exit animation length.
pub const DEFAULT_EXIT: Duration = Duration::from_millis(195);
/// Default deadline multiplier.
pub const DEFAULT_FALLBACK_FACTOR: u32 = 2;

/// Declared animation timing for one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Entry animation length.
    pub enter: Duration,
    /// Exit animation length.
    pub exit: Duration,
    /// Deadline multiplier applied to the declared length. Clamped to `>= 1`.
    pub fallback_factor: u32,
    /// Treat both animations as zero-length.
    pub reduced_motion: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enter: DEFAULT_ENTER,
            exit: DEFAULT_EXIT,
            fallback_factor: DEFAULT_FALLBACK_FACTOR,
            reduced_motion: false,
        }
    }
}

impl AnimationConfig {
    /// Timing with explicit lengths and the default factor.
    #[must_use]
    pub fn new(enter: Duration, exit: Duration) -> Self {
        Self {
            enter,
            exit,
            ..Self::default()
        }
    }

    /// Set the entry length.
    #[must_use]
    pub fn enter(mut self, enter: Duration) -> Self {
        self.enter = enter;
        self
    }

    /// Set the exit length.
    #[must_use]
    pub fn exit(mut self, exit: Duration) -> Self {
        self.exit = exit;
        self
    }

    /// Set the deadline multiplier.
    #[must_use]
    pub fn fallback_factor(mut self, factor: u32) -> Self {
        self.fallback_factor = factor;
        self
    }

    /// Honor a reduced-motion preference.
    #[must_use]
    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Entry length after the reduced-motion override.
    #[must_use]
    pub fn effective_enter(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            self.enter
        }
    }

    /// Exit length after the reduced-motion override.
    #[must_use]
    pub fn effective_exit(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            self.exit
        }
    }

    /// Deadline for an entry started at `start`.
    #[must_use]
    pub fn enter_deadline(&self, start: Instant) -> Instant {
        start + self.scaled(self.effective_enter())
    }

    /// Deadline for an exit started at `start`.
    #[must_use]
    pub fn exit_deadline(&self, start: Instant) -> Instant {
        start + self.scaled(self.effective_exit())
    }

    fn scaled(&self, duration: Duration) -> Duration {
        duration.saturating_mul(self.fallback_factor.max(1))
    }
}
