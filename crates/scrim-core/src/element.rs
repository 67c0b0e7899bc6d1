#![forbid(unsafe_code)]

//! Element handles and the in-memory [`ElementTree`] document.
//!
//! `ElementTree` is a small arena-backed tree with a single body element.
//! Elements are created detached and become part of the document once
//! appended (directly or transitively) under the body. Detached subtrees
//! keep their structure, which is how overlays are mounted and unmounted
//! without rebuilding their content.
//!
//! # Failure Modes
//!
//! - Operations on ids from another tree return
//!   [`DocumentError::UnknownElement`].
//! - Focusing a detached element returns [`DocumentError::Detached`].
//! - Focusing a non-interactive element without a tabindex, or a disabled
//!   control, returns [`DocumentError::NotFocusable`].

use ahash::AHashMap;

use crate::document::{Document, DocumentError};

/// Handle to an element in a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a host-assigned raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of element this is, as far as focus is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementKind {
    /// A generic block (`div`, `section`, dialog surface, backdrop).
    #[default]
    Container,
    /// Static text.
    Text,
    Button,
    /// An anchor. Only anchors with an `href` are interactive.
    Link { has_href: bool },
    Input,
    Select,
    TextArea,
}

impl ElementKind {
    /// Whether the host makes this kind focusable without a tabindex.
    #[must_use]
    pub const fn is_natively_focusable(self) -> bool {
        match self {
            Self::Button | Self::Input | Self::Select | Self::TextArea => true,
            Self::Link { has_href } => has_href,
            Self::Container | Self::Text => false,
        }
    }
}

/// Element attributes read by the overlay layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    kind: ElementKind,
    tab_index: Option<i32>,
    disabled: bool,
    label: Option<String>,
}

impl Element {
    /// Create an element of the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn container() -> Self {
        Self::new(ElementKind::Container)
    }

    #[must_use]
    pub fn button() -> Self {
        Self::new(ElementKind::Button)
    }

    #[must_use]
    pub fn link(has_href: bool) -> Self {
        Self::new(ElementKind::Link { has_href })
    }

    #[must_use]
    pub fn input() -> Self {
        Self::new(ElementKind::Input)
    }

    /// Set an explicit tabindex.
    #[must_use]
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    /// Mark the element disabled.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attach a debugging label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn tab_index(&self) -> Option<i32> {
        self.tab_index
    }

    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether a programmatic `focus()` call can land on this element.
    ///
    /// Any explicit tabindex (including negative) makes an element a
    /// programmatic focus target; disabled controls never are.
    #[must_use]
    pub fn accepts_focus(&self) -> bool {
        !self.disabled && (self.kind.is_natively_focusable() || self.tab_index.is_some())
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// In-memory document.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: AHashMap<ElementId, Node>,
    body: ElementId,
    next_id: u64,
    active: Option<ElementId>,
    scroll_locked: bool,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a document holding only the body element.
    #[must_use]
    pub fn new() -> Self {
        let body = ElementId(0);
        let mut nodes = AHashMap::new();
        nodes.insert(
            body,
            Node {
                element: Element::container().with_label("body"),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            body,
            next_id: 1,
            active: None,
            scroll_locked: false,
        }
    }

    /// Create a detached element.
    pub fn create(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                element,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Create an element and append it under `parent`.
    pub fn create_child(
        &mut self,
        parent: ElementId,
        element: Element,
    ) -> Result<ElementId, DocumentError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DocumentError::UnknownElement(parent));
        }
        let id = self.create(element);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Children of `id` in order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of elements known to the tree (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the body is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop focus without moving it anywhere.
    pub fn blur(&mut self) {
        self.active = None;
    }

    fn node(&self, id: ElementId) -> Result<&Node, DocumentError> {
        self.nodes.get(&id).ok_or(DocumentError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, DocumentError> {
        self.nodes
            .get_mut(&id)
            .ok_or(DocumentError::UnknownElement(id))
    }

    fn unlink(&mut self, id: ElementId) -> Result<(), DocumentError> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            let siblings = &mut self.node_mut(parent)?.children;
            siblings.retain(|&child| child != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }
}

impl Document for ElementTree {
    fn body(&self) -> ElementId {
        self.body
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(&id).map(|node| &node.element)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(&root) else {
            return out;
        };
        let mut stack: Vec<ElementId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_attached(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id) && self.contains(self.body, id)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DocumentError> {
        self.node(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DocumentError::Cycle { parent, child });
        }
        self.unlink(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, id: ElementId) -> Result<(), DocumentError> {
        self.node(id)?;
        if let Some(active) = self.active
            && self.contains(id, active)
        {
            self.active = None;
        }
        self.unlink(id)
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn focus(&mut self, id: ElementId) -> Result<(), DocumentError> {
        let node = self.node(id)?;
        if !node.element.accepts_focus() {
            return Err(DocumentError::NotFocusable(id));
        }
        if !self.is_attached(id) {
            return Err(DocumentError::Detached(id));
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "scrim::document", element = id.raw(), "focus");
        self.active = Some(id);
        Ok(())
    }

    fn set_tab_index(
        &mut self,
        id: ElementId,
        tab_index: Option<i32>,
    ) -> Result<(), DocumentError> {
        self.node_mut(id)?.element.tab_index = tab_index;
        Ok(())
    }

    fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_has_only_body() {
        let tree = ElementTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_attached(tree.body()));
        assert!(tree.active_element().is_none());
        assert!(!tree.is_scroll_locked());
    }

    #[test]
    fn created_elements_start_detached() {
        let mut tree = ElementTree::new();
        let id = tree.create(Element::button());
        assert!(!tree.is_attached(id));
        tree.append_child(tree.body(), id).unwrap();
        assert!(tree.is_attached(id));
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut tree = ElementTree::new();
        let body = tree.body();
        let a = tree.create_child(body, Element::container()).unwrap();
        let a1 = tree.create_child(a, Element::button()).unwrap();
        let a2 = tree.create_child(a, Element::button()).unwrap();
        let a1x = tree.create_child(a1, Element::input()).unwrap();
        let b = tree.create_child(body, Element::container()).unwrap();

        assert_eq!(tree.descendants(body), vec![a, a1, a1x, a2, b]);
        assert_eq!(tree.descendants(a), vec![a1, a1x, a2]);
        assert!(tree.descendants(a2).is_empty());
    }

    #[test]
    fn append_moves_between_parents() {
        let mut tree = ElementTree::new();
        let body = tree.body();
        let a = tree.create_child(body, Element::container()).unwrap();
        let b = tree.create_child(body, Element::container()).unwrap();
        let child = tree.create_child(a, Element::button()).unwrap();

        tree.append_child(b, child).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[child]);
        assert_eq!(tree.parent(child), Some(b));
    }

    #[test]
    fn append_rejects_cycles() {
        let mut tree = ElementTree::new();
        let outer = tree.create_child(tree.body(), Element::container()).unwrap();
        let inner = tree.create_child(outer, Element::container()).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(DocumentError::Cycle {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            tree.append_child(outer, outer),
            Err(DocumentError::Cycle {
                parent: outer,
                child: outer
            })
        );
    }

    #[test]
    fn focus_requires_attached_focusable_element() {
        let mut tree = ElementTree::new();
        let body = tree.body();
        let div = tree.create_child(body, Element::container()).unwrap();
        let detached = tree.create(Element::button());
        let disabled = tree
            .create_child(body, Element::button().with_disabled(true))
            .unwrap();
        let button = tree.create_child(body, Element::button()).unwrap();

        assert_eq!(tree.focus(div), Err(DocumentError::NotFocusable(div)));
        assert_eq!(tree.focus(detached), Err(DocumentError::Detached(detached)));
        assert_eq!(
            tree.focus(disabled),
            Err(DocumentError::NotFocusable(disabled))
        );
        tree.focus(button).unwrap();
        assert_eq!(tree.active_element(), Some(button));

        // A synthetic tabindex makes any container a focus target.
        tree.set_tab_index(div, Some(-1)).unwrap();
        tree.focus(div).unwrap();
        assert_eq!(tree.active_element(), Some(div));
    }

    #[test]
    fn detaching_focused_subtree_blurs() {
        let mut tree = ElementTree::new();
        let panel = tree.create_child(tree.body(), Element::container()).unwrap();
        let button = tree.create_child(panel, Element::button()).unwrap();
        tree.focus(button).unwrap();

        tree.detach(panel).unwrap();
        assert!(tree.active_element().is_none());
        assert!(!tree.is_attached(button));
        // Structure survives detachment.
        assert_eq!(tree.parent(button), Some(panel));
    }

    #[test]
    fn bubble_path_walks_to_body() {
        let mut tree = ElementTree::new();
        let body = tree.body();
        let a = tree.create_child(body, Element::container()).unwrap();
        let b = tree.create_child(a, Element::button()).unwrap();
        assert_eq!(tree.bubble_path(b), vec![b, a, body]);
        assert!(tree.contains(a, b));
        assert!(tree.contains(b, b));
        assert!(!tree.contains(b, a));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut tree = ElementTree::new();
        let ghost = ElementId::from_raw(999);
        assert_eq!(
            tree.append_child(tree.body(), ghost),
            Err(DocumentError::UnknownElement(ghost))
        );
        assert_eq!(tree.detach(ghost), Err(DocumentError::UnknownElement(ghost)));
        assert!(!tree.is_attached(ghost));
        assert!(tree.descendants(ghost).is_empty());
    }

    #[test]
    fn link_focusability_depends_on_href() {
        assert!(Element::link(true).accepts_focus());
        assert!(!Element::link(false).accepts_focus());
        assert!(Element::link(false).with_tab_index(0).accepts_focus());
    }
}
