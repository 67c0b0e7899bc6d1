#![forbid(unsafe_code)]

//! Error types for overlay operations.
//!
//! Degraded behavior (no focusable content, a detached restore target, a
//! bubbled backdrop click, a duplicate animation-end) is never an error.
//! These types cover API misuse and host failures only.

use scrim_core::document::DocumentError;
use scrim_core::element::ElementId;

use crate::controller::OverlayId;

/// Errors from [`OverlayStack`](crate::OverlayStack) and
/// [`OverlayController`](crate::OverlayController) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayError {
    /// No overlay with this id is mounted.
    UnknownOverlay(OverlayId),
    /// The overlay root is not inside its backdrop.
    RootOutsideBackdrop { backdrop: ElementId, root: ElementId },
    /// The host document rejected a mutation.
    Document(DocumentError),
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOverlay(id) => write!(f, "unknown overlay {}", id.id()),
            Self::RootOutsideBackdrop { backdrop, root } => {
                write!(f, "overlay root {root} is not inside backdrop {backdrop}")
            }
            Self::Document(err) => write!(f, "document error: {err}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Document(err) => Some(err),
            Self::UnknownOverlay(_) | Self::RootOutsideBackdrop { .. } => None,
        }
    }
}

impl From<DocumentError> for OverlayError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

/// Errors from loading an [`OverlayConfig`](crate::OverlayConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input could not be parsed.
    Parse(String),
    /// A field held an out-of-range value.
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
