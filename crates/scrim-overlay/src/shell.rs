#![forbid(unsafe_code)]

//! Presentational shells: Modal, BottomSheet, SideSheet.
//!
//! All three share one lifecycle controller and differ only in what they
//! hand back to the renderer: animation classes per phase, default timing,
//! and cosmetic variant classes. Size, height, width and side enums have no
//! behavioral effect.

use std::time::Duration;

use crate::animation::AnimationConfig;

/// Rendering strategy for an overlay.
pub trait OverlayShell {
    /// Component name, used in logs and as the class prefix.
    fn name(&self) -> &'static str;

    /// Animation class applied while opening or open.
    fn enter_class(&self) -> &'static str;

    /// Animation class applied while closing.
    fn exit_class(&self) -> &'static str;

    /// Variant classes for the surface element.
    fn surface_classes(&self) -> Vec<&'static str>;

    /// Default timing for this shell.
    fn animation(&self) -> AnimationConfig {
        AnimationConfig::default()
    }
}

/// Modal dialog width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalSize {
    Small,
    #[default]
    Medium,
    Large,
    FullScreen,
}

/// Centered dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalShell {
    pub size: ModalSize,
}

impl ModalShell {
    #[must_use]
    pub fn new(size: ModalSize) -> Self {
        Self { size }
    }
}

impl OverlayShell for ModalShell {
    fn name(&self) -> &'static str {
        "modal"
    }

    fn enter_class(&self) -> &'static str {
        "scrim-modal-enter"
    }

    fn exit_class(&self) -> &'static str {
        "scrim-modal-exit"
    }

    fn surface_classes(&self) -> Vec<&'static str> {
        let size = match self.size {
            ModalSize::Small => "scrim-modal--sm",
            ModalSize::Medium => "scrim-modal--md",
            ModalSize::Large => "scrim-modal--lg",
            ModalSize::FullScreen => "scrim-modal--full",
        };
        vec!["scrim-modal", size]
    }
}

/// Bottom sheet resting height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetHeight {
    #[default]
    Auto,
    Half,
    Full,
}

/// Sheet anchored to the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BottomSheetShell {
    pub height: SheetHeight,
}

impl BottomSheetShell {
    #[must_use]
    pub fn new(height: SheetHeight) -> Self {
        Self { height }
    }
}

impl OverlayShell for BottomSheetShell {
    fn name(&self) -> &'static str {
        "bottom-sheet"
    }

    fn enter_class(&self) -> &'static str {
        "scrim-bottom-sheet-slide-up"
    }

    fn exit_class(&self) -> &'static str {
        "scrim-bottom-sheet-slide-down"
    }

    fn surface_classes(&self) -> Vec<&'static str> {
        let height = match self.height {
            SheetHeight::Auto => "scrim-bottom-sheet--auto",
            SheetHeight::Half => "scrim-bottom-sheet--half",
            SheetHeight::Full => "scrim-bottom-sheet--full",
        };
        vec!["scrim-bottom-sheet", height]
    }

    fn animation(&self) -> AnimationConfig {
        AnimationConfig::new(Duration::from_millis(300), Duration::from_millis(250))
    }
}

/// Edge a side sheet slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    #[default]
    Right,
}

/// Side sheet width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetWidth {
    Narrow,
    #[default]
    Regular,
    Wide,
}

/// Sheet anchored to a vertical edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideSheetShell {
    pub side: Side,
    pub width: SheetWidth,
}

impl SideSheetShell {
    #[must_use]
    pub fn new(side: Side, width: SheetWidth) -> Self {
        Self { side, width }
    }
}

impl OverlayShell for SideSheetShell {
    fn name(&self) -> &'static str {
        "side-sheet"
    }

    fn enter_class(&self) -> &'static str {
        match self.side {
            Side::Left => "scrim-side-sheet-in-left",
            Side::Right => "scrim-side-sheet-in-right",
        }
    }

    fn exit_class(&self) -> &'static str {
        match self.side {
            Side::Left => "scrim-side-sheet-out-left",
            Side::Right => "scrim-side-sheet-out-right",
        }
    }

    fn surface_classes(&self) -> Vec<&'static str> {
        let side = match self.side {
            Side::Left => "scrim-side-sheet--left",
            Side::Right => "scrim-side-sheet--right",
        };
        let width = match self.width {
            SheetWidth::Narrow => "scrim-side-sheet--narrow",
            SheetWidth::Regular => "scrim-side-sheet--regular",
            SheetWidth::Wide => "scrim-side-sheet--wide",
        };
        vec!["scrim-side-sheet", side, width]
    }

    fn animation(&self) -> AnimationConfig {
        AnimationConfig::new(Duration::from_millis(250), Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_classes() {
        let shell = ModalShell::new(ModalSize::Large);
        assert_eq!(shell.enter_class(), "scrim-modal-enter");
        assert_eq!(shell.exit_class(), "scrim-modal-exit");
        assert_eq!(shell.surface_classes(), vec!["scrim-modal", "scrim-modal--lg"]);
        assert_eq!(shell.animation(), AnimationConfig::default());
    }

    #[test]
    fn side_sheet_classes_follow_side() {
        let left = SideSheetShell::new(Side::Left, SheetWidth::Wide);
        assert_eq!(left.enter_class(), "scrim-side-sheet-in-left");
        assert_eq!(left.exit_class(), "scrim-side-sheet-out-left");
        assert!(left.surface_classes().contains(&"scrim-side-sheet--wide"));

        let right = SideSheetShell::default();
        assert_eq!(right.enter_class(), "scrim-side-sheet-in-right");
    }

    #[test]
    fn sheets_declare_their_own_timing() {
        let sheet = BottomSheetShell::new(SheetHeight::Half);
        assert_eq!(sheet.animation().exit, Duration::from_millis(250));
        assert_eq!(sheet.name(), "bottom-sheet");
    }
}
