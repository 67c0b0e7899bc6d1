#![forbid(unsafe_code)]

//! Overlay lifecycle for scrim.
//!
//! An overlay is a layer above the page (modal dialog, bottom sheet, side
//! sheet) that traps focus, locks page scroll and dismisses on backdrop
//! click or Escape. This crate provides:
//!
//! - [`OverlayController`]: the `Closed → Opening → Open → Closing` state
//!   machine and every side effect its transitions own.
//! - [`FocusTrap`]: focus capture, Tab wrapping and focus restore.
//! - [`DismissalPolicy`]: backdrop-click and Escape gating.
//! - [`ScrollLock`]: reference-counted page scroll lock.
//! - [`OverlayShell`]: presentational variants sharing one controller.
//! - [`OverlayStack`]: stacked overlays over one [`Document`], with event
//!   routing and fallback ticking.
//!
//! [`Document`]: scrim_core::Document

pub mod animation;
pub mod config;
pub mod controller;
pub mod dismissal;
pub mod error;
pub mod focus_trap;
pub mod phase;
pub mod scroll_lock;
pub mod shell;
pub mod stack;

pub use animation::AnimationConfig;
pub use config::OverlayConfig;
pub use controller::{
    EventOutcome, OnClose, OverlayContext, OverlayController, OverlayId, OverlayOptions,
};
pub use dismissal::{CloseRequest, DismissReason, DismissalConfig, DismissalPolicy};
pub use error::{ConfigError, OverlayError};
pub use focus_trap::{
    FocusSnapshot, FocusTarget, FocusTrap, FocusableSet, TabOutcome, is_tabbable,
};
pub use phase::{OverlayPhase, OverlayState, PhaseChange};
pub use scroll_lock::{ScrollLock, ScrollLockGuard};
pub use shell::{
    BottomSheetShell, ModalShell, ModalSize, OverlayShell, SheetHeight, SheetWidth, Side,
    SideSheetShell,
};
pub use stack::{BASE_OVERLAY_Z, Clock, OverlayStack, Z_INCREMENT};
