#![forbid(unsafe_code)]

//! The host document seen by the overlay layer.
//!
//! [`Document`] is the seam between scrim and a concrete UI host. It exposes
//! just enough of a DOM-like tree for overlay lifecycle work: structure
//! queries (parent, descendants, attachment), focus, tabindex, mounting a
//! subtree under a portal host, and the page-level scroll lock flag.
//!
//! [`ElementTree`](crate::element::ElementTree) is the in-memory
//! implementation used for headless hosts and tests.
//!
//! # Invariants
//!
//! - `descendants(root)` is in document (pre-order) order and excludes `root`.
//! - `contains(a, b)` is inclusive: `contains(a, a)` holds for any known `a`.
//! - `active_element()` is always attached; detaching a subtree that holds
//!   focus blurs it.

use crate::element::{Element, ElementId};

/// Errors from document mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    /// The element id is not known to this document.
    UnknownElement(ElementId),
    /// The element exists but is not attached to the document.
    Detached(ElementId),
    /// The element cannot take focus (not interactive and no tabindex, or disabled).
    NotFocusable(ElementId),
    /// Appending would make an element its own ancestor.
    Cycle { parent: ElementId, child: ElementId },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element {id}"),
            Self::Detached(id) => write!(f, "element {id} is not attached to the document"),
            Self::NotFocusable(id) => write!(f, "element {id} cannot receive focus"),
            Self::Cycle { parent, child } => {
                write!(f, "appending {child} under {parent} would create a cycle")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// A DOM-like host document.
pub trait Document {
    /// The element overlays are portaled under (the document body).
    fn body(&self) -> ElementId;

    /// Look up an element's attributes.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Parent of `id`, if it has one.
    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: ElementId) -> Vec<ElementId>;

    /// Whether `id` is reachable from the body.
    fn is_attached(&self, id: ElementId) -> bool;

    /// Append `child` as the last child of `parent`, moving it if needed.
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DocumentError>;

    /// Remove `id` (and its subtree) from its parent. The subtree stays
    /// addressable and can be re-attached later.
    fn detach(&mut self, id: ElementId) -> Result<(), DocumentError>;

    /// The currently focused element.
    fn active_element(&self) -> Option<ElementId>;

    /// Move focus to `id`.
    fn focus(&mut self, id: ElementId) -> Result<(), DocumentError>;

    /// Set or clear the explicit tabindex of `id`.
    fn set_tab_index(&mut self, id: ElementId, tab_index: Option<i32>)
    -> Result<(), DocumentError>;

    /// Whether page scrolling is currently suppressed.
    fn is_scroll_locked(&self) -> bool;

    /// Suppress or restore page scrolling.
    fn set_scroll_locked(&mut self, locked: bool);

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// `target` followed by each of its ancestors, innermost first.
    ///
    /// This is the path a bubbling event travels.
    fn bubble_path(&self, target: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }
}
