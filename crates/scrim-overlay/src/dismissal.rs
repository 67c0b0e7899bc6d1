#![forbid(unsafe_code)]

//! Backdrop-click and Escape dismissal gating.
//!
//! Dismissal never closes an overlay by itself. A qualifying trigger yields a
//! [`DismissReason`]; the controller turns it into a [`CloseRequest`] for the
//! owner, who decides whether to flip `open`.

use scrim_core::element::ElementId;
use scrim_core::event::{KeyCode, KeyEvent, MouseEvent};

use crate::controller::OverlayId;

/// Per-render dismissal switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissalConfig {
    pub close_on_backdrop_click: bool,
    pub close_on_escape: bool,
}

impl Default for DismissalConfig {
    fn default() -> Self {
        Self {
            close_on_backdrop_click: true,
            close_on_escape: true,
        }
    }
}

impl DismissalConfig {
    /// Both triggers disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            close_on_backdrop_click: false,
            close_on_escape: false,
        }
    }

    #[must_use]
    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.close_on_backdrop_click = close;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }
}

/// Why a close was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// The backdrop itself was clicked.
    Backdrop,
    /// Escape was pressed while the overlay was top-most.
    Escape,
    /// An explicit close affordance (close button, API call).
    Explicit,
}

impl DismissReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backdrop => "backdrop",
            Self::Escape => "escape",
            Self::Explicit => "explicit",
        }
    }
}

/// A close request delivered to the overlay's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRequest {
    pub overlay: OverlayId,
    pub reason: DismissReason,
}

/// Applies a [`DismissalConfig`] to raw events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DismissalPolicy {
    config: DismissalConfig,
}

impl DismissalPolicy {
    #[must_use]
    pub const fn new(config: DismissalConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> DismissalConfig {
        self.config
    }

    /// Replace the configuration (it is re-supplied every render).
    pub fn set_config(&mut self, config: DismissalConfig) {
        self.config = config;
    }

    /// A click reached the backdrop listener attached to `current_target`.
    ///
    /// Only a click whose target *is* the backdrop qualifies; clicks that
    /// bubbled up from overlay content are ignored.
    #[must_use]
    pub fn on_backdrop_click(
        &self,
        event: &MouseEvent,
        current_target: ElementId,
    ) -> Option<DismissReason> {
        (self.config.close_on_backdrop_click
            && event.is_primary_click()
            && event.target == current_target)
            .then_some(DismissReason::Backdrop)
    }

    /// A keydown reached the document listener.
    #[must_use]
    pub fn on_escape_key(&self, event: &KeyEvent) -> Option<DismissReason> {
        (self.config.close_on_escape && event.code == KeyCode::Escape && event.is_press())
            .then_some(DismissReason::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::event::{KeyEventKind, MouseButton, MouseEventKind};

    fn backdrop() -> ElementId {
        ElementId::from_raw(10)
    }

    fn content() -> ElementId {
        ElementId::from_raw(11)
    }

    #[test]
    fn defaults_enable_both_triggers() {
        let config = DismissalConfig::default();
        assert!(config.close_on_backdrop_click);
        assert!(config.close_on_escape);
    }

    #[test]
    fn backdrop_click_on_backdrop_itself() {
        let policy = DismissalPolicy::default();
        let click = MouseEvent::click(backdrop());
        assert_eq!(
            policy.on_backdrop_click(&click, backdrop()),
            Some(DismissReason::Backdrop)
        );
    }

    #[test]
    fn bubbled_content_click_is_ignored() {
        let policy = DismissalPolicy::default();
        let click = MouseEvent::click(content());
        assert_eq!(policy.on_backdrop_click(&click, backdrop()), None);
    }

    #[test]
    fn backdrop_click_disabled() {
        let policy =
            DismissalPolicy::new(DismissalConfig::default().close_on_backdrop_click(false));
        for _ in 0..5 {
            assert_eq!(
                policy.on_backdrop_click(&MouseEvent::click(backdrop()), backdrop()),
                None
            );
        }
    }

    #[test]
    fn only_primary_click_dismisses() {
        let policy = DismissalPolicy::default();
        let right = MouseEvent::new(MouseEventKind::Click(MouseButton::Right), backdrop());
        assert_eq!(policy.on_backdrop_click(&right, backdrop()), None);
    }

    #[test]
    fn escape_gating() {
        let enabled = DismissalPolicy::default();
        let disabled = DismissalPolicy::new(DismissalConfig::none());
        let escape = KeyEvent::new(KeyCode::Escape);

        assert_eq!(enabled.on_escape_key(&escape), Some(DismissReason::Escape));
        assert_eq!(disabled.on_escape_key(&escape), None);
        assert_eq!(enabled.on_escape_key(&KeyEvent::new(KeyCode::Enter)), None);
        assert_eq!(
            enabled.on_escape_key(&escape.with_kind(KeyEventKind::Release)),
            None
        );
    }

    #[test]
    fn set_config_replaces() {
        let mut policy = DismissalPolicy::default();
        policy.set_config(DismissalConfig::none());
        assert_eq!(policy.config(), DismissalConfig::none());
    }
}
