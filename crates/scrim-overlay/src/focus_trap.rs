#![forbid(unsafe_code)]

//! Focus trap: initial focus, Tab wrapping, and focus restoration.
//!
//! # Focus Trap Semantics
//!
//! While an overlay is interactive, Tab and Shift+Tab wrap at the edges of
//! its [`FocusableSet`]:
//!
//! | Focus | Key | Result |
//! |-------|-----|--------|
//! | last element | Tab | first element, default prevented |
//! | first element | Shift+Tab | last element, default prevented |
//! | outside the overlay | Tab / Shift+Tab | first / last, default prevented |
//! | anywhere, empty set | any Tab | stays on root, default prevented |
//! | elsewhere inside | any Tab | passes through to the host |
//!
//! The set is computed once per open and is not kept in sync with later
//! DOM mutations; content inserted while open joins the cycle on the next
//! open.
//!
//! # Failure Modes
//!
//! - Empty set: the overlay root gets a synthetic `tabindex=-1` and focus.
//! - Snapshot element detached at close time: restoration is skipped.

use scrim_core::document::{Document, DocumentError};
use scrim_core::element::{Element, ElementId};
use scrim_core::event::KeyEvent;

/// Whether `element` participates in Tab order.
///
/// Buttons, links with `href`, form controls, and anything with an explicit
/// non-negative tabindex. Disabled controls and negative tabindex hosts are
/// skipped.
#[must_use]
pub fn is_tabbable(element: &Element) -> bool {
    if element.is_disabled() {
        return false;
    }
    match element.tab_index() {
        Some(index) => index >= 0,
        None => element.kind().is_natively_focusable(),
    }
}

/// Tabbable descendants of an overlay root, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusableSet {
    elements: Vec<ElementId>,
}

impl FocusableSet {
    /// Query `root` for tabbable descendants.
    #[must_use]
    pub fn compute<D: Document + ?Sized>(doc: &D, root: ElementId) -> Self {
        let elements = doc
            .descendants(root)
            .into_iter()
            .filter(|&id| doc.element(id).is_some_and(is_tabbable))
            .collect();
        Self { elements }
    }

    #[must_use]
    pub fn first(&self) -> Option<ElementId> {
        self.elements.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<ElementId> {
        self.elements.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ElementId] {
        &self.elements
    }
}

/// The element focused before an overlay opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusSnapshot {
    pub previously_focused: Option<ElementId>,
}

impl FocusSnapshot {
    /// Record the document's current focus.
    #[must_use]
    pub fn capture<D: Document + ?Sized>(doc: &D) -> Self {
        Self {
            previously_focused: doc.active_element(),
        }
    }

    /// Return focus to the recorded element if it is still attached.
    ///
    /// Returns the element that received focus, or `None` if restoration
    /// was skipped.
    pub fn restore<D: Document + ?Sized>(self, doc: &mut D) -> Option<ElementId> {
        let target = self.previously_focused?;
        if !doc.is_attached(target) {
            tracing::trace!(
                target: "scrim::overlay",
                element = target.raw(),
                "focus restore skipped: element detached"
            );
            return None;
        }
        match doc.focus(target) {
            Ok(()) => Some(target),
            Err(err) => {
                tracing::trace!(target: "scrim::overlay", %err, "focus restore skipped");
                None
            }
        }
    }
}

/// Where initial focus landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// The first tabbable descendant.
    First(ElementId),
    /// The overlay root (no tabbable descendants).
    Root(ElementId),
}

impl FocusTarget {
    #[must_use]
    pub const fn element(self) -> ElementId {
        match self {
            Self::First(id) | Self::Root(id) => id,
        }
    }
}

/// What the host should do with a Tab keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    /// Let the host move focus natively.
    PassThrough,
    /// Suppress the host's default; focus was handled here.
    Prevented,
}

/// Focus trap for one open cycle of one overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    root: ElementId,
    set: FocusableSet,
    synthetic_tab_index: bool,
}

impl FocusTrap {
    /// Compute the trap for `root`.
    #[must_use]
    pub fn compute<D: Document + ?Sized>(doc: &D, root: ElementId) -> Self {
        Self {
            root,
            set: FocusableSet::compute(doc, root),
            synthetic_tab_index: false,
        }
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    #[must_use]
    pub fn set(&self) -> &FocusableSet {
        &self.set
    }

    /// Whether the root was given a tabindex by [`FocusTrap::focus_first`].
    #[must_use]
    pub fn has_synthetic_tab_index(&self) -> bool {
        self.synthetic_tab_index
    }

    /// Move focus into the overlay.
    ///
    /// # Errors
    ///
    /// Propagates document errors (e.g. the root is not attached).
    pub fn focus_first<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<FocusTarget, DocumentError> {
        if let Some(first) = self.set.first() {
            doc.focus(first)?;
            return Ok(FocusTarget::First(first));
        }
        self.ensure_root_focusable(doc)?;
        doc.focus(self.root)?;
        Ok(FocusTarget::Root(self.root))
    }

    /// Apply Tab wrapping for a keydown.
    ///
    /// Non-Tab keys pass through.
    pub fn handle_tab<D: Document + ?Sized>(&self, doc: &mut D, event: &KeyEvent) -> TabOutcome {
        let backward = event.is_back_tab();
        if !(backward || event.is_tab()) || !event.is_press() {
            return TabOutcome::PassThrough;
        }

        let active = doc.active_element();
        let inside = active.is_some_and(|id| doc.contains(self.root, id));

        let (Some(first), Some(last)) = (self.set.first(), self.set.last()) else {
            if !inside && let Err(err) = doc.focus(self.root) {
                tracing::trace!(target: "scrim::overlay", %err, "could not pull focus to root");
            }
            return TabOutcome::Prevented;
        };

        let target = if !inside {
            Some(if backward { last } else { first })
        } else if backward && active == Some(first) {
            Some(last)
        } else if !backward && active == Some(last) {
            Some(first)
        } else {
            None
        };

        let Some(target) = target else {
            return TabOutcome::PassThrough;
        };
        tracing::trace!(
            target: "scrim::overlay",
            element = target.raw(),
            backward,
            "tab wrapped"
        );
        if let Err(err) = doc.focus(target) {
            tracing::trace!(target: "scrim::overlay", %err, "tab wrap focus failed");
        }
        TabOutcome::Prevented
    }

    /// Undo any tabindex this trap added to the root.
    pub fn release<D: Document + ?Sized>(&mut self, doc: &mut D) {
        if self.synthetic_tab_index {
            // The root is ours; an unknown id here means the host dropped it.
            if let Err(err) = doc.set_tab_index(self.root, None) {
                tracing::trace!(target: "scrim::overlay", %err, "tabindex release skipped");
            }
            self.synthetic_tab_index = false;
        }
    }

    fn ensure_root_focusable<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<(), DocumentError> {
        let element = doc
            .element(self.root)
            .ok_or(DocumentError::UnknownElement(self.root))?;
        if element.tab_index().is_none() {
            doc.set_tab_index(self.root, Some(-1))?;
            self.synthetic_tab_index = true;
        }
        Ok(())
    }
}
