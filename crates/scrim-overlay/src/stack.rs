#![forbid(unsafe_code)]

//! Overlay stack: owns the document, listener registry and scroll lock,
//! and routes host events to the right controller.
//!
//! Overlays are mounted once and then driven by `set_open`. Each time an
//! overlay starts opening it is raised above every other overlay, so the
//! most recently opened overlay is top-most.
//!
//! # Invariants
//!
//! - Z-order is strictly increasing: a newly opened overlay gets a z-index
//!   greater than any rendered one. Numbering restarts when nothing else is
//!   rendered.
//! - Only the top-most rendered overlay restores focus when it closes. A
//!   covered overlay hands its saved element to the overlay above it.
//! - Keydown goes only to the top-most overlay with a live keydown listener.
//! - Clicks bubble from their target to the body; each backdrop listener on
//!   the path sees the click with itself as the current target.
//! - The document's scroll flag mirrors the lock after every operation.
//!
//! # Failure Modes
//!
//! - Operations on an unmounted id return [`OverlayError::UnknownOverlay`].
//! - Events nobody listens for return [`EventOutcome::Ignored`].
//!
//! # Example
//!
//! ```
//! use scrim_core::{Document, Element, ElementTree, Event, KeyCode, KeyEvent};
//! use scrim_overlay::{OverlayOptions, OverlayPhase, OverlayStack};
//!
//! let mut doc = ElementTree::new();
//! let backdrop = doc.create(Element::container());
//! let root = doc.create_child(backdrop, Element::container()).unwrap();
//! doc.create_child(root, Element::button()).unwrap();
//!
//! let mut stack = OverlayStack::new(doc);
//! let id = stack.mount(OverlayOptions::new(backdrop, root).uncontrolled()).unwrap();
//! stack.set_open(id, true).unwrap();
//! assert_eq!(stack.phase(id), Some(OverlayPhase::Opening));
//!
//! stack.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape))).unwrap();
//! assert_eq!(stack.phase(id), Some(OverlayPhase::Closing));
//! ```

use ahash::AHashSet;
use scrim_core::document::{Document, DocumentError};
use scrim_core::element::ElementId;
use scrim_core::event::{AnimationEvent, Event, KeyEvent, MouseEvent};
use scrim_core::listener::{ListenerKind, ListenerRegistry, ListenerTarget};
use web_time::Instant;

use crate::controller::{EventOutcome, OverlayContext, OverlayController, OverlayId, OverlayOptions};
use crate::dismissal::{CloseRequest, DismissReason, DismissalConfig};
use crate::error::OverlayError;
use crate::focus_trap::FocusSnapshot;
use crate::phase::{OverlayPhase, OverlayState, PhaseChange};
use crate::scroll_lock::ScrollLock;

/// Base z-index for the overlay layer.
pub const BASE_OVERLAY_Z: u32 = 1000;

/// Z-index increment between overlays.
pub const Z_INCREMENT: u32 = 10;

/// Time source for fallback deadlines.
pub type Clock = Box<dyn Fn() -> Instant>;

/// A mounted overlay.
struct ActiveOverlay {
    controller: OverlayController,
    z_index: u32,
}

/// Stack of overlays sharing one document.
pub struct OverlayStack<D: Document> {
    doc: D,
    listeners: ListenerRegistry,
    scroll_lock: ScrollLock,
    /// Mounted overlays in mount order.
    overlays: Vec<ActiveOverlay>,
    next_z: u32,
    clock: Clock,
}

impl<D: Document> std::fmt::Debug for OverlayStack<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStack")
            .field("overlays", &self.overlays.len())
            .field("listeners", &self.listeners.len())
            .field("scroll_lock", &self.scroll_lock.holders())
            .field("next_z", &self.next_z)
            .finish_non_exhaustive()
    }
}

impl<D: Document> OverlayStack<D> {
    /// Stack over `doc`, reading time from the system clock.
    pub fn new(doc: D) -> Self {
        Self::with_clock(doc, Box::new(Instant::now))
    }

    /// Stack with an injected clock (tests, replay).
    pub fn with_clock(doc: D, clock: Clock) -> Self {
        Self {
            doc,
            listeners: ListenerRegistry::new(),
            scroll_lock: ScrollLock::new(),
            overlays: Vec::new(),
            next_z: 0,
            clock,
        }
    }

    // --- Mounting ---

    /// Mount an overlay. If its `open` flag is already true it starts
    /// opening immediately.
    ///
    /// # Errors
    ///
    /// - [`OverlayError::Document`] if either element is unknown.
    /// - [`OverlayError::RootOutsideBackdrop`] if `root` is not inside
    ///   `backdrop`.
    pub fn mount(&mut self, options: OverlayOptions) -> Result<OverlayId, OverlayError> {
        let (backdrop, root) = (options.backdrop(), options.root());
        for id in [backdrop, root] {
            if self.doc.element(id).is_none() {
                return Err(DocumentError::UnknownElement(id).into());
            }
        }
        if !self.doc.contains(backdrop, root) {
            return Err(OverlayError::RootOutsideBackdrop { backdrop, root });
        }
        // Closed overlays are never in the document.
        if self.doc.is_attached(backdrop) {
            self.doc.detach(backdrop)?;
        }

        let controller = OverlayController::new(options);
        let id = controller.id();
        tracing::debug!(
            target: "scrim::overlay",
            overlay = id.id(),
            shell = controller.shell().name(),
            "mount"
        );
        self.overlays.push(ActiveOverlay {
            controller,
            z_index: BASE_OVERLAY_Z,
        });
        if let Err(err) = self.drive(id, |c, cx| c.reconcile(cx).map(|change| (change, ()))) {
            self.overlays.retain(|o| o.controller.id() != id);
            return Err(err);
        }
        Ok(id)
    }

    /// Unmount an overlay, tearing down any open state without animation.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownOverlay`] if `id` is not mounted.
    pub fn unmount(&mut self, id: OverlayId) -> Result<(), OverlayError> {
        let idx = self.index_of(id)?;
        let mut entry = self.overlays.remove(idx);
        let covered = self.is_covered(id, entry.z_index);
        let mut cx = OverlayContext {
            doc: &mut self.doc,
            listeners: &self.listeners,
            scroll_lock: &self.scroll_lock,
            now: (self.clock)(),
            restore_focus: !covered,
        };
        let result = entry.controller.teardown(&mut cx);
        if let Some(saved) = entry.controller.take_released_focus() {
            self.hand_off_focus(id, entry.controller.backdrop(), entry.z_index, saved);
        }
        drop(entry);
        self.scroll_lock.sync(&mut self.doc);
        tracing::debug!(target: "scrim::overlay", overlay = id.id(), "unmount");
        result
    }

    // --- Owner API ---

    /// The owner's `open` flag changed.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownOverlay`] or a document error from mounting.
    pub fn set_open(
        &mut self,
        id: OverlayId,
        open: bool,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        self.drive(id, |c, cx| {
            c.on_external_open_change(open, cx).map(|change| (change, ()))
        })
        .map(|(changes, ())| changes.last().copied())
    }

    /// Explicit close (close button or API call).
    ///
    /// Goes through `on_close` like any other dismissal.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownOverlay`] if `id` is not mounted.
    pub fn close(&mut self, id: OverlayId) -> Result<CloseRequest, OverlayError> {
        self.drive(id, |c, cx| {
            c.request_close(DismissReason::Explicit, cx)
                .map(|request| (None, request))
        })
        .map(|(_, request)| request)
    }

    /// Replace an overlay's dismissal switches.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownOverlay`] if `id` is not mounted.
    pub fn set_dismissal(
        &mut self,
        id: OverlayId,
        config: DismissalConfig,
    ) -> Result<(), OverlayError> {
        let idx = self.index_of(id)?;
        self.overlays[idx].controller.set_dismissal(config);
        Ok(())
    }

    // --- Host events ---

    /// Route a host event.
    ///
    /// # Errors
    ///
    /// Document errors raised while a transition mounts or unmounts.
    pub fn handle_event(&mut self, event: &Event) -> Result<EventOutcome, OverlayError> {
        match event {
            Event::Key(key) => self.route_key(key),
            Event::Mouse(mouse) => self.route_click(mouse),
            Event::AnimationEnd(animation) => self.route_animation_end(animation),
        }
    }

    /// Finalize overlays whose fallback deadline has passed.
    ///
    /// # Errors
    ///
    /// Document errors raised while unmounting.
    pub fn tick(&mut self) -> Result<Vec<(OverlayId, PhaseChange)>, OverlayError> {
        let now = (self.clock)();
        let due: Vec<OverlayId> = self
            .overlays
            .iter()
            .filter(|o| o.controller.deadline().is_some_and(|d| d <= now))
            .map(|o| o.controller.id())
            .collect();

        let mut fired = Vec::new();
        for id in due {
            let (changes, ()) = self.drive(id, |c, cx| c.tick(cx).map(|change| (change, ())))?;
            fired.extend(changes.into_iter().map(|change| (id, change)));
        }
        Ok(fired)
    }

    /// Earliest pending fallback deadline, for scheduling the next `tick`.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.overlays
            .iter()
            .filter_map(|o| o.controller.deadline())
            .min()
    }

    fn route_key(&mut self, key: &KeyEvent) -> Result<EventOutcome, OverlayError> {
        let owners: AHashSet<u64> = self
            .listeners
            .owners(ListenerKind::KeyDown, ListenerTarget::Document)
            .into_iter()
            .collect();
        let Some(top) = self
            .overlays
            .iter()
            .filter(|o| owners.contains(&o.controller.id().id()))
            .max_by_key(|o| o.z_index)
            .map(|o| o.controller.id())
        else {
            return Ok(EventOutcome::Ignored);
        };

        let _span = tracing::debug_span!(
            target: "scrim::overlay",
            "keydown",
            overlay = top.id(),
            code = ?key.code
        )
        .entered();
        self.drive_event(top, |c, cx| c.handle_key(key, cx))
    }

    fn route_click(&mut self, mouse: &MouseEvent) -> Result<EventOutcome, OverlayError> {
        let path = self.doc.bubble_path(mouse.target);
        let mut outcome = EventOutcome::Ignored;
        for current in path {
            let owners = self
                .listeners
                .owners(ListenerKind::Click, ListenerTarget::Element(current));
            for owner in owners {
                let Some(id) = self.id_for_owner(owner) else {
                    continue;
                };
                let result = self.drive_event(id, |c, cx| {
                    c.handle_backdrop_click(mouse, current, cx)
                })?;
                match result {
                    EventOutcome::CloseRequested(_) => return Ok(result),
                    EventOutcome::Ignored => {}
                    _ => outcome = result,
                }
            }
        }
        Ok(outcome)
    }

    fn route_animation_end(
        &mut self,
        animation: &AnimationEvent,
    ) -> Result<EventOutcome, OverlayError> {
        let target = animation.target;
        let Some(id) = self
            .overlays
            .iter()
            .filter(|o| o.controller.is_rendered())
            .find(|o| self.doc.contains(o.controller.root(), target))
            .map(|o| o.controller.id())
        else {
            return Ok(EventOutcome::Ignored);
        };
        let (changes, ()) = self.drive(id, |c, cx| {
            c.on_animation_end(animation, cx).map(|change| (change, ()))
        })?;
        Ok(changes
            .last()
            .copied()
            .map_or(EventOutcome::Ignored, EventOutcome::PhaseChanged))
    }

    // --- Queries ---

    #[must_use]
    pub fn phase(&self, id: OverlayId) -> Option<OverlayPhase> {
        self.controller(id).map(OverlayController::phase)
    }

    #[must_use]
    pub fn state(&self, id: OverlayId) -> Option<OverlayState> {
        self.controller(id).map(OverlayController::state)
    }

    #[must_use]
    pub fn is_rendered(&self, id: OverlayId) -> bool {
        self.controller(id).is_some_and(OverlayController::is_rendered)
    }

    #[must_use]
    pub fn controller(&self, id: OverlayId) -> Option<&OverlayController> {
        self.overlays
            .iter()
            .find(|o| o.controller.id() == id)
            .map(|o| &o.controller)
    }

    #[must_use]
    pub fn z_index(&self, id: OverlayId) -> Option<u32> {
        self.overlays
            .iter()
            .find(|o| o.controller.id() == id)
            .map(|o| o.z_index)
    }

    /// Top-most interactive overlay.
    #[must_use]
    pub fn top(&self) -> Option<OverlayId> {
        self.overlays
            .iter()
            .filter(|o| o.controller.phase().is_interactive())
            .max_by_key(|o| o.z_index)
            .map(|o| o.controller.id())
    }

    /// Number of rendered overlays.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.overlays
            .iter()
            .filter(|o| o.controller.is_rendered())
            .count()
    }

    /// Number of mounted overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.doc.is_scroll_locked()
    }

    #[must_use]
    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Mutable access for host-side edits (content changes, user focus).
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    // --- Internal ---

    /// Whether another rendered overlay sits above `z_index`.
    fn is_covered(&self, id: OverlayId, z_index: u32) -> bool {
        self.overlays.iter().any(|o| {
            o.controller.id() != id && o.controller.is_rendered() && o.z_index > z_index
        })
    }

    /// A covered overlay closed without restoring focus. The overlay
    /// directly above inherits its saved element if its own saved element
    /// lived inside the subtree that just closed.
    fn hand_off_focus(
        &mut self,
        id: OverlayId,
        backdrop: ElementId,
        z_index: u32,
        saved: FocusSnapshot,
    ) {
        let doc = &self.doc;
        let Some(above) = self
            .overlays
            .iter_mut()
            .filter(|o| {
                o.controller.id() != id && o.controller.is_rendered() && o.z_index > z_index
            })
            .min_by_key(|o| o.z_index)
        else {
            return;
        };
        let inherits = above.controller.focus_snapshot().is_none_or(|own| {
            own.previously_focused
                .is_none_or(|element| doc.contains(backdrop, element))
        });
        if inherits {
            tracing::trace!(
                target: "scrim::overlay",
                overlay = above.controller.id().id(),
                from = id.id(),
                "focus restore target handed off"
            );
            above.controller.replace_focus_snapshot(saved);
        }
    }

    fn index_of(&self, id: OverlayId) -> Result<usize, OverlayError> {
        self.overlays
            .iter()
            .position(|o| o.controller.id() == id)
            .ok_or(OverlayError::UnknownOverlay(id))
    }

    fn id_for_owner(&self, owner: u64) -> Option<OverlayId> {
        self.overlays
            .iter()
            .map(|o| o.controller.id())
            .find(|id| id.id() == owner)
    }

    fn drive_event<F>(&mut self, id: OverlayId, op: F) -> Result<EventOutcome, OverlayError>
    where
        F: FnOnce(
            &mut OverlayController,
            &mut OverlayContext<'_, D>,
        ) -> Result<EventOutcome, OverlayError>,
    {
        let (changes, outcome) = self.drive(id, |c, cx| {
            let before = c.phase();
            let outcome = op(c, cx)?;
            let change = (c.phase() != before).then_some(PhaseChange {
                from: before,
                to: c.phase(),
            });
            Ok((change, outcome))
        })?;
        Ok(match outcome {
            EventOutcome::Ignored | EventOutcome::Passed => changes
                .last()
                .copied()
                .map_or(outcome, EventOutcome::PhaseChanged),
            other => other,
        })
    }

    /// Run `op` against one controller, then finish any reopen that was
    /// requested while it was closing, pass on its saved focus if it closed
    /// underneath another overlay, raise it if it started opening, and
    /// mirror the scroll lock.
    fn drive<F, R>(&mut self, id: OverlayId, op: F) -> Result<(Vec<PhaseChange>, R), OverlayError>
    where
        F: FnOnce(
            &mut OverlayController,
            &mut OverlayContext<'_, D>,
        ) -> Result<(Option<PhaseChange>, R), OverlayError>,
    {
        let idx = self.index_of(id)?;
        let now = (self.clock)();
        let z_before = self.overlays[idx].z_index;
        let covered = self.is_covered(id, z_before);
        let entry = &mut self.overlays[idx];
        let mut cx = OverlayContext {
            doc: &mut self.doc,
            listeners: &self.listeners,
            scroll_lock: &self.scroll_lock,
            now,
            restore_focus: !covered,
        };

        let (first, value) = op(&mut entry.controller, &mut cx)?;
        let mut changes: Vec<PhaseChange> = first.into_iter().collect();
        if changes.last().is_some_and(|c| c.to == OverlayPhase::Closed)
            && let Some(change) = entry.controller.reconcile(&mut cx)?
        {
            changes.push(change);
        }
        let released = entry.controller.take_released_focus();
        let backdrop = entry.controller.backdrop();
        if let Some(saved) = released {
            self.hand_off_focus(id, backdrop, z_before, saved);
        }

        if changes.iter().any(|c| c.to == OverlayPhase::Opening) {
            // Renumber from the base once nothing else is on screen.
            if !self
                .overlays
                .iter()
                .any(|o| o.controller.id() != id && o.controller.is_rendered())
            {
                self.next_z = 0;
            }
            self.overlays[idx].z_index = BASE_OVERLAY_Z.saturating_add(self.next_z);
            self.next_z = self.next_z.saturating_add(Z_INCREMENT);
        }
        self.scroll_lock.sync(&mut self.doc);
        Ok((changes, value))
    }
}
