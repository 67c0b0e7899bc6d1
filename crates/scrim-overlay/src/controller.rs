#![forbid(unsafe_code)]

//! Overlay lifecycle controller.
//!
//! One [`OverlayController`] turns an external `open` flag into the
//! four-phase lifecycle of [`OverlayPhase`] and performs each transition's
//! side effects exactly once:
//!
//! | Transition | Side effects |
//! |------------|--------------|
//! | `Closed → Opening` | capture focus snapshot, mount subtree, acquire scroll lock, focus first element, register keydown + backdrop click listeners, arm entry deadline |
//! | `Opening → Open` | clear deadline |
//! | `Opening/Open → Closing` | drop listener subscriptions, arm exit deadline |
//! | `Closing → Closed` | release trap tabindex, unmount subtree, release scroll lock, restore focus (or release the saved element when `restore_focus` is off) |
//!
//! # Invariants
//!
//! - `phase == Closed` iff the backdrop subtree is detached from the document.
//! - Listener subscriptions exist iff `phase` is `Opening` or `Open`.
//! - A scroll lock guard is held iff `phase != Closed`.
//! - Animation-end events only count when their target is the root itself.
//!
//! # Failure Modes
//!
//! - Focus cannot be placed (host rejects it): logged, lifecycle continues.
//! - Exit animation-end never arrives: [`OverlayController::tick`] finalizes
//!   once the fallback deadline passes.
//! - `open` flips back to true while closing: recorded; [`reconcile`] starts
//!   a fresh cycle once the exit completes.
//!
//! [`reconcile`]: OverlayController::reconcile

use std::sync::atomic::{AtomicU64, Ordering};

use scrim_core::controlled::Controlled;
use scrim_core::document::Document;
use scrim_core::element::ElementId;
use scrim_core::event::{AnimationEvent, KeyCode, KeyEvent, MouseEvent};
use scrim_core::listener::{ListenerKind, ListenerRegistry, ListenerTarget, Subscription};
use web_time::Instant;

use crate::animation::AnimationConfig;
use crate::config::OverlayConfig;
use crate::dismissal::{CloseRequest, DismissReason, DismissalConfig, DismissalPolicy};
use crate::error::OverlayError;
use crate::focus_trap::{FocusSnapshot, FocusTrap, TabOutcome};
use crate::phase::{OverlayPhase, OverlayState, PhaseChange};
use crate::scroll_lock::{ScrollLock, ScrollLockGuard};
use crate::shell::{ModalShell, OverlayShell};

/// Global counter for unique overlay IDs.
static OVERLAY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    fn new() -> Self {
        Self(OVERLAY_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Close callback supplied by the overlay's owner.
pub type OnClose = Box<dyn FnMut(CloseRequest)>;

/// What happened to an event handed to an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// No live listener took the event.
    Ignored,
    /// A listener saw the event and left the host default alone.
    Passed,
    /// The host default must be suppressed (Tab wrap).
    DefaultPrevented,
    /// A dismissal trigger fired and the owner was asked to close.
    CloseRequested(CloseRequest),
    /// A lifecycle event moved the phase.
    PhaseChanged(PhaseChange),
}

/// Everything a controller touches outside itself.
pub struct OverlayContext<'a, D: Document + ?Sized> {
    pub doc: &'a mut D,
    pub listeners: &'a ListenerRegistry,
    pub scroll_lock: &'a ScrollLock,
    pub now: Instant,
    /// Whether finishing a close returns focus to the saved element. Off
    /// while a higher overlay is still rendered; the saved element is then
    /// kept for [`OverlayController::take_released_focus`].
    pub restore_focus: bool,
}

/// Construction options for an overlay.
///
/// `backdrop` is the element mounted under the document body while the
/// overlay is rendered; `root` is the overlay surface inside it, which owns
/// the focus trap and the animation-end events.
pub struct OverlayOptions {
    backdrop: ElementId,
    root: ElementId,
    shell: Box<dyn OverlayShell>,
    config: OverlayConfig,
    open: Controlled<bool>,
    on_close: Option<OnClose>,
    title: Option<String>,
}

impl std::fmt::Debug for OverlayOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayOptions")
            .field("backdrop", &self.backdrop)
            .field("root", &self.root)
            .field("shell", &self.shell.name())
            .field("config", &self.config)
            .field("open", &self.open)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl OverlayOptions {
    /// Controlled, initially closed modal over `backdrop` / `root`.
    #[must_use]
    pub fn new(backdrop: ElementId, root: ElementId) -> Self {
        Self {
            backdrop,
            root,
            shell: Box::new(ModalShell::default()),
            config: OverlayConfig::default(),
            open: Controlled::external(false, |_| {}),
            on_close: None,
            title: None,
        }
    }

    /// Presentational shell (Modal, BottomSheet, SideSheet, or custom).
    #[must_use]
    pub fn shell(mut self, shell: impl OverlayShell + 'static) -> Self {
        self.shell = Box::new(shell);
        self
    }

    #[must_use]
    pub fn config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.config.dismissal.close_on_backdrop_click = close;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.config.dismissal.close_on_escape = close;
        self
    }

    /// Override the shell's timing.
    #[must_use]
    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.config.animation = Some(animation);
        self
    }

    /// Initial value of the owner's `open` flag.
    #[must_use]
    pub fn open(mut self, open: bool) -> Self {
        self.open.set(open);
        self
    }

    /// Called for every honored dismissal and explicit close.
    #[must_use]
    pub fn on_close(mut self, on_close: impl FnMut(CloseRequest) + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// Controlled mode with a value-level change hook (`open` → `false`).
    #[must_use]
    pub fn on_open_change(mut self, on_change: impl FnMut(bool) + 'static) -> Self {
        let current = *self.open.get();
        let mut on_change = on_change;
        self.open = Controlled::external(current, move |value: &bool| on_change(*value));
        self
    }

    /// Uncontrolled mode: the overlay owns `open` and closes itself when
    /// dismissed.
    #[must_use]
    pub fn uncontrolled(mut self) -> Self {
        self.open = Controlled::owned(*self.open.get());
        self
    }

    /// Dialog title. Content only.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn backdrop(&self) -> ElementId {
        self.backdrop
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }
}

/// Lifecycle controller for one overlay instance.
pub struct OverlayController {
    id: OverlayId,
    backdrop: ElementId,
    root: ElementId,
    shell: Box<dyn OverlayShell>,
    animation: AnimationConfig,
    policy: DismissalPolicy,
    open: Controlled<bool>,
    on_close: Option<OnClose>,
    title: Option<String>,
    phase: OverlayPhase,
    snapshot: Option<FocusSnapshot>,
    released: Option<FocusSnapshot>,
    trap: Option<FocusTrap>,
    subscriptions: Vec<Subscription>,
    scroll_guard: Option<ScrollLockGuard>,
    deadline: Option<Instant>,
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("id", &self.id)
            .field("shell", &self.shell.name())
            .field("phase", &self.phase)
            .field("requested_open", self.open.get())
            .field("listeners", &self.subscriptions.len())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl OverlayController {
    /// Create a controller. Nothing is mounted until `open` is true and
    /// [`reconcile`](Self::reconcile) runs.
    #[must_use]
    pub fn new(options: OverlayOptions) -> Self {
        let animation = options
            .config
            .animation
            .unwrap_or_else(|| options.shell.animation());
        Self {
            id: OverlayId::new(),
            backdrop: options.backdrop,
            root: options.root,
            shell: options.shell,
            animation,
            policy: DismissalPolicy::new(options.config.dismissal),
            open: options.open,
            on_close: options.on_close,
            title: options.title,
            phase: OverlayPhase::Closed,
            snapshot: None,
            released: None,
            trap: None,
            subscriptions: Vec::new(),
            scroll_guard: None,
            deadline: None,
        }
    }

    // --- Queries ---

    #[inline]
    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    #[must_use]
    pub fn backdrop(&self) -> ElementId {
        self.backdrop
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        OverlayState {
            phase: self.phase,
            requested_open: *self.open.get(),
        }
    }

    /// Render gate: false while `Closed`.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.phase.is_rendered()
    }

    /// Animation class for the current phase, `None` when not rendered.
    #[must_use]
    pub fn animation_class(&self) -> Option<&'static str> {
        match self.phase {
            OverlayPhase::Closed => None,
            OverlayPhase::Opening | OverlayPhase::Open => Some(self.shell.enter_class()),
            OverlayPhase::Closing => Some(self.shell.exit_class()),
        }
    }

    #[must_use]
    pub fn shell(&self) -> &dyn OverlayShell {
        self.shell.as_ref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn animation(&self) -> AnimationConfig {
        self.animation
    }

    #[must_use]
    pub fn dismissal(&self) -> DismissalConfig {
        self.policy.config()
    }

    /// Replace the dismissal switches (they are re-supplied each render).
    pub fn set_dismissal(&mut self, config: DismissalConfig) {
        self.policy.set_config(config);
    }

    /// Focus trap for the current cycle.
    #[must_use]
    pub fn focus_trap(&self) -> Option<&FocusTrap> {
        self.trap.as_ref()
    }

    /// Focus saved when the current cycle opened.
    #[must_use]
    pub fn focus_snapshot(&self) -> Option<FocusSnapshot> {
        self.snapshot
    }

    /// Replace the focus saved for the current cycle. No-op while closed.
    pub fn replace_focus_snapshot(&mut self, snapshot: FocusSnapshot) {
        if self.phase.is_rendered() {
            self.snapshot = Some(snapshot);
        }
    }

    /// Saved focus left unrestored by the last close because
    /// `restore_focus` was off.
    pub fn take_released_focus(&mut self) -> Option<FocusSnapshot> {
        self.released.take()
    }

    /// Pending fallback deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether dismissal listeners are registered.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Whether the owner's value is externally controlled.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.open.is_external()
    }

    // --- Lifecycle ---

    /// The owner's `open` flag changed.
    ///
    /// # Errors
    ///
    /// Propagates document errors from mounting the subtree.
    pub fn on_external_open_change<D: Document + ?Sized>(
        &mut self,
        open: bool,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        self.open.set(open);
        self.reconcile(cx)
    }

    /// Drive the phase toward the requested state.
    ///
    /// Starts an entry from `Closed`, starts an exit from `Opening`/`Open`,
    /// and otherwise does nothing. A request that arrives mid-exit is
    /// applied on the first `reconcile` after the exit completes.
    ///
    /// # Errors
    ///
    /// Propagates document errors from mounting the subtree.
    pub fn reconcile<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        let requested = *self.open.get();
        match (self.phase, requested) {
            (OverlayPhase::Closed, true) => self.enter(cx).map(Some),
            (OverlayPhase::Opening | OverlayPhase::Open, false) => Ok(Some(self.begin_exit(cx))),
            _ => Ok(None),
        }
    }

    /// An animation ended somewhere at or below the root.
    ///
    /// # Errors
    ///
    /// Propagates document errors from unmounting the subtree.
    pub fn on_animation_end<D: Document + ?Sized>(
        &mut self,
        event: &AnimationEvent,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        if event.target != self.root {
            return Ok(None);
        }
        match self.phase {
            OverlayPhase::Opening => Ok(Some(self.settle_open())),
            OverlayPhase::Closing => self.finish_exit(cx).map(Some),
            OverlayPhase::Closed | OverlayPhase::Open => Ok(None),
        }
    }

    /// The exit animation finished.
    ///
    /// No-op unless `Closing`.
    ///
    /// # Errors
    ///
    /// Propagates document errors from unmounting the subtree.
    pub fn on_exit_animation_complete<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        if self.phase != OverlayPhase::Closing {
            return Ok(None);
        }
        self.finish_exit(cx).map(Some)
    }

    /// Force-finalize a phase whose fallback deadline has passed.
    ///
    /// # Errors
    ///
    /// Propagates document errors from unmounting the subtree.
    pub fn tick<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<Option<PhaseChange>, OverlayError> {
        let Some(deadline) = self.deadline else {
            return Ok(None);
        };
        if cx.now < deadline {
            return Ok(None);
        }
        match self.phase {
            OverlayPhase::Opening => Ok(Some(self.settle_open())),
            OverlayPhase::Closing => {
                tracing::debug!(
                    target: "scrim::overlay",
                    overlay = self.id.id(),
                    "exit animation timed out, finalizing"
                );
                self.finish_exit(cx).map(Some)
            }
            OverlayPhase::Closed | OverlayPhase::Open => {
                self.deadline = None;
                Ok(None)
            }
        }
    }

    // --- Input ---

    /// A keydown reached this overlay's document listener.
    ///
    /// Escape goes through the dismissal policy, Tab through the focus
    /// trap. Without a live listener the event is ignored.
    ///
    /// # Errors
    ///
    /// Propagates document errors from a self-close in uncontrolled mode.
    pub fn handle_key<D: Document + ?Sized>(
        &mut self,
        event: &KeyEvent,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<EventOutcome, OverlayError> {
        if !self.is_listening() {
            return Ok(EventOutcome::Ignored);
        }
        if event.code == KeyCode::Escape {
            return match self.policy.on_escape_key(event) {
                Some(reason) => self.request_close(reason, cx).map(EventOutcome::CloseRequested),
                None => Ok(EventOutcome::Passed),
            };
        }
        if event.is_tab() || event.is_back_tab() {
            let Some(trap) = self.trap.as_ref() else {
                return Ok(EventOutcome::Passed);
            };
            return Ok(match trap.handle_tab(cx.doc, event) {
                TabOutcome::Prevented => EventOutcome::DefaultPrevented,
                TabOutcome::PassThrough => EventOutcome::Passed,
            });
        }
        Ok(EventOutcome::Passed)
    }

    /// A click bubbled to the backdrop listener on `current_target`.
    ///
    /// # Errors
    ///
    /// Propagates document errors from a self-close in uncontrolled mode.
    pub fn handle_backdrop_click<D: Document + ?Sized>(
        &mut self,
        event: &MouseEvent,
        current_target: ElementId,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<EventOutcome, OverlayError> {
        if !self.is_listening() || current_target != self.backdrop {
            return Ok(EventOutcome::Ignored);
        }
        match self.policy.on_backdrop_click(event, current_target) {
            Some(reason) => self
                .request_close(reason, cx)
                .map(EventOutcome::CloseRequested),
            None => Ok(EventOutcome::Passed),
        }
    }

    /// Ask the owner to close this overlay.
    ///
    /// Invokes `on_close`. In uncontrolled mode the overlay also flips its
    /// own `open` flag and starts exiting; in controlled mode nothing moves
    /// until the owner sets `open = false`.
    ///
    /// # Errors
    ///
    /// Propagates document errors from a self-close in uncontrolled mode.
    pub fn request_close<D: Document + ?Sized>(
        &mut self,
        reason: DismissReason,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<CloseRequest, OverlayError> {
        let request = CloseRequest {
            overlay: self.id,
            reason,
        };
        tracing::debug!(
            target: "scrim::overlay",
            overlay = self.id.id(),
            reason = reason.as_str(),
            "close requested"
        );
        if let Some(on_close) = self.on_close.as_mut() {
            on_close(request);
        }
        if self.open.request(false) {
            self.reconcile(cx)?;
        }
        Ok(request)
    }

    /// Tear everything down immediately (the overlay is being unmounted).
    ///
    /// Skips the exit animation. Focus is restored as for a normal close.
    ///
    /// # Errors
    ///
    /// Propagates document errors from unmounting the subtree.
    pub fn teardown<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<(), OverlayError> {
        match self.phase {
            OverlayPhase::Closed => return Ok(()),
            OverlayPhase::Opening | OverlayPhase::Open => {
                self.begin_exit(cx);
            }
            OverlayPhase::Closing => {}
        }
        self.finish_exit(cx).map(|_| ())
    }

    // --- Transitions ---

    fn enter<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<PhaseChange, OverlayError> {
        let snapshot = FocusSnapshot::capture(&*cx.doc);
        let body = cx.doc.body();
        cx.doc.append_child(body, self.backdrop)?;
        self.snapshot = Some(snapshot);

        self.scroll_guard = Some(cx.scroll_lock.acquire());
        cx.scroll_lock.sync(cx.doc);

        let mut trap = FocusTrap::compute(&*cx.doc, self.root);
        match trap.focus_first(cx.doc) {
            Ok(target) => tracing::trace!(
                target: "scrim::overlay",
                overlay = self.id.id(),
                element = target.element().raw(),
                focusable = trap.set().len(),
                "initial focus"
            ),
            Err(err) => tracing::warn!(
                target: "scrim::overlay",
                overlay = self.id.id(),
                %err,
                "could not move focus into overlay"
            ),
        }
        self.trap = Some(trap);

        let owner = self.id.id();
        self.subscriptions = vec![
            cx.listeners
                .register(ListenerKind::KeyDown, ListenerTarget::Document, owner),
            cx.listeners.register(
                ListenerKind::Click,
                ListenerTarget::Element(self.backdrop),
                owner,
            ),
        ];

        self.deadline = Some(self.animation.enter_deadline(cx.now));
        Ok(self.set_phase(OverlayPhase::Opening))
    }

    fn settle_open(&mut self) -> PhaseChange {
        self.deadline = None;
        self.set_phase(OverlayPhase::Open)
    }

    fn begin_exit<D: Document + ?Sized>(&mut self, cx: &mut OverlayContext<'_, D>) -> PhaseChange {
        self.subscriptions.clear();
        self.deadline = Some(self.animation.exit_deadline(cx.now));
        self.set_phase(OverlayPhase::Closing)
    }

    fn finish_exit<D: Document + ?Sized>(
        &mut self,
        cx: &mut OverlayContext<'_, D>,
    ) -> Result<PhaseChange, OverlayError> {
        if let Some(mut trap) = self.trap.take() {
            trap.release(cx.doc);
        }
        cx.doc.detach(self.backdrop)?;
        self.deadline = None;
        let change = self.set_phase(OverlayPhase::Closed);

        self.scroll_guard = None;
        cx.scroll_lock.sync(cx.doc);

        match self.snapshot.take() {
            Some(snapshot) if cx.restore_focus => {
                snapshot.restore(cx.doc);
            }
            saved => self.released = saved,
        }
        Ok(change)
    }

    fn set_phase(&mut self, next: OverlayPhase) -> PhaseChange {
        let from = self.phase;
        debug_assert!(
            from.can_transition_to(next),
            "illegal overlay transition {from} -> {next}"
        );
        self.phase = next;
        tracing::debug!(
            target: "scrim::overlay",
            overlay = self.id.id(),
            shell = self.shell.name(),
            from = from.as_str(),
            to = next.as_str(),
            "phase"
        );
        PhaseChange { from, to: next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::element::{Element, ElementTree};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Harness {
        doc: ElementTree,
        listeners: ListenerRegistry,
        scroll_lock: ScrollLock,
        now: Instant,
        trigger: ElementId,
        backdrop: ElementId,
        root: ElementId,
        buttons: Vec<ElementId>,
    }

    impl Harness {
        fn new(buttons: usize) -> Self {
            let mut doc = ElementTree::new();
            let trigger = doc.create_child(doc.body(), Element::button()).unwrap();
            let backdrop = doc.create(Element::container().with_label("backdrop"));
            let root = doc.create_child(backdrop, Element::container()).unwrap();
            let buttons = (0..buttons)
                .map(|_| doc.create_child(root, Element::button()).unwrap())
                .collect();
            doc.focus(trigger).unwrap();
            Self {
                doc,
                listeners: ListenerRegistry::new(),
                scroll_lock: ScrollLock::new(),
                now: Instant::now(),
                trigger,
                backdrop,
                root,
                buttons,
            }
        }

        fn cx(&mut self) -> OverlayContext<'_, ElementTree> {
            OverlayContext {
                doc: &mut self.doc,
                listeners: &self.listeners,
                scroll_lock: &self.scroll_lock,
                now: self.now,
                restore_focus: true,
            }
        }

        fn controller(&self) -> OverlayController {
            OverlayController::new(OverlayOptions::new(self.backdrop, self.root))
        }
    }

    #[test]
    fn starts_closed_and_unmounted() {
        let h = Harness::new(1);
        let c = h.controller();
        assert_eq!(c.phase(), OverlayPhase::Closed);
        assert!(!c.is_rendered());
        assert_eq!(c.animation_class(), None);
        assert!(!h.doc.is_attached(h.root));
    }

    #[test]
    fn open_performs_entry_side_effects() {
        let mut h = Harness::new(2);
        let mut c = h.controller();

        let change = c.on_external_open_change(true, &mut h.cx()).unwrap();
        assert_eq!(
            change,
            Some(PhaseChange {
                from: OverlayPhase::Closed,
                to: OverlayPhase::Opening
            })
        );
        assert!(h.doc.is_attached(h.root));
        assert_eq!(h.doc.active_element(), Some(h.buttons[0]));
        assert!(h.doc.is_scroll_locked());
        assert_eq!(h.listeners.count_for(c.id().id()), 2);
        assert_eq!(c.animation_class(), Some("scrim-modal-enter"));
        assert!(c.deadline().is_some());
    }

    #[test]
    fn close_defers_cleanup_until_exit_completes() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();

        assert_eq!(c.phase(), OverlayPhase::Closing);
        assert!(h.doc.is_attached(h.root));
        assert!(h.doc.is_scroll_locked());
        assert!(h.listeners.is_empty());
        assert_eq!(c.animation_class(), Some("scrim-modal-exit"));

        let change = c.on_exit_animation_complete(&mut h.cx()).unwrap();
        assert_eq!(change.map(|c| c.to), Some(OverlayPhase::Closed));
        assert!(!h.doc.is_attached(h.root));
        assert!(!h.doc.is_scroll_locked());
        assert_eq!(h.doc.active_element(), Some(h.trigger));
    }

    #[test]
    fn close_without_restore_releases_saved_focus() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();
        assert_eq!(c.focus_snapshot().unwrap().previously_focused, Some(h.trigger));

        let mut cx = h.cx();
        cx.restore_focus = false;
        c.on_exit_animation_complete(&mut cx).unwrap();
        assert_eq!(c.phase(), OverlayPhase::Closed);
        assert_eq!(h.doc.active_element(), None);
        assert_eq!(c.focus_snapshot(), None);

        let released = c.take_released_focus().unwrap();
        assert_eq!(released.previously_focused, Some(h.trigger));
        assert_eq!(c.take_released_focus(), None);
    }

    #[test]
    fn exit_complete_is_idempotent() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        assert_eq!(c.on_exit_animation_complete(&mut h.cx()).unwrap(), None);

        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();
        assert!(c.on_exit_animation_complete(&mut h.cx()).unwrap().is_some());
        assert_eq!(c.on_exit_animation_complete(&mut h.cx()).unwrap(), None);
    }

    #[test]
    fn bubbled_animation_end_is_ignored() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();

        let child = AnimationEvent::new(h.buttons[0]);
        assert_eq!(c.on_animation_end(&child, &mut h.cx()).unwrap(), None);
        assert_eq!(c.phase(), OverlayPhase::Closing);

        let own = AnimationEvent::new(h.root);
        assert!(c.on_animation_end(&own, &mut h.cx()).unwrap().is_some());
        assert_eq!(c.phase(), OverlayPhase::Closed);
    }

    #[test]
    fn entry_animation_end_settles_open() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        let root = h.root;
        c.on_animation_end(&AnimationEvent::new(root), &mut h.cx())
            .unwrap();
        assert_eq!(c.phase(), OverlayPhase::Open);
        assert!(c.deadline().is_none());
        // Still interactive.
        assert!(c.is_listening());
    }

    #[test]
    fn close_during_opening() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        let change = c.on_external_open_change(false, &mut h.cx()).unwrap();
        assert_eq!(
            change,
            Some(PhaseChange {
                from: OverlayPhase::Opening,
                to: OverlayPhase::Closing
            })
        );
    }

    #[test]
    fn redundant_open_changes_are_noops() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        assert_eq!(c.on_external_open_change(false, &mut h.cx()).unwrap(), None);
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        assert_eq!(c.on_external_open_change(true, &mut h.cx()).unwrap(), None);
        assert_eq!(h.scroll_lock.holders(), 1);
    }

    #[test]
    fn fallback_tick_finalizes_stuck_exit() {
        let mut h = Harness::new(1);
        let mut c = OverlayController::new(
            OverlayOptions::new(h.backdrop, h.root).animation(AnimationConfig::new(
                Duration::from_millis(100),
                Duration::from_millis(100),
            )),
        );
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();

        h.now += Duration::from_millis(150);
        assert_eq!(c.tick(&mut h.cx()).unwrap(), None);
        assert_eq!(c.phase(), OverlayPhase::Closing);

        h.now += Duration::from_millis(60);
        assert!(c.tick(&mut h.cx()).unwrap().is_some());
        assert_eq!(c.phase(), OverlayPhase::Closed);
        assert!(!h.doc.is_scroll_locked());
    }

    #[test]
    fn reduced_motion_finalizes_on_first_tick() {
        let mut h = Harness::new(1);
        let mut c = OverlayController::new(
            OverlayOptions::new(h.backdrop, h.root)
                .animation(AnimationConfig::default().reduced_motion(true)),
        );
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        assert!(c.tick(&mut h.cx()).unwrap().is_some());
        assert_eq!(c.phase(), OverlayPhase::Open);
        c.on_external_open_change(false, &mut h.cx()).unwrap();
        assert!(c.tick(&mut h.cx()).unwrap().is_some());
        assert_eq!(c.phase(), OverlayPhase::Closed);
    }

    #[test]
    fn escape_requests_close_without_closing() {
        let mut h = Harness::new(1);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut c = OverlayController::new(
            OverlayOptions::new(h.backdrop, h.root)
                .on_close(move |req: CloseRequest| sink.borrow_mut().push(req.reason)),
        );
        c.on_external_open_change(true, &mut h.cx()).unwrap();

        let outcome = c
            .handle_key(&KeyEvent::new(KeyCode::Escape), &mut h.cx())
            .unwrap();
        assert!(matches!(outcome, EventOutcome::CloseRequested(_)));
        assert_eq!(*calls.borrow(), vec![DismissReason::Escape]);
        // Owner-driven: still opening until `open` flips.
        assert_eq!(c.phase(), OverlayPhase::Opening);
    }

    #[test]
    fn uncontrolled_overlay_closes_itself() {
        let mut h = Harness::new(1);
        let mut c = OverlayController::new(
            OverlayOptions::new(h.backdrop, h.root)
                .open(true)
                .uncontrolled(),
        );
        assert!(!c.is_controlled());
        c.reconcile(&mut h.cx()).unwrap();
        assert_eq!(c.phase(), OverlayPhase::Opening);

        c.handle_key(&KeyEvent::new(KeyCode::Escape), &mut h.cx())
            .unwrap();
        assert_eq!(c.phase(), OverlayPhase::Closing);
        assert!(!c.state().requested_open);
    }

    #[test]
    fn open_change_hook_sees_close_requests() {
        let mut h = Harness::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut c = OverlayController::new(
            OverlayOptions::new(h.backdrop, h.root)
                .on_open_change(move |open| sink.borrow_mut().push(open)),
        );
        assert!(c.is_controlled());
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.request_close(DismissReason::Explicit, &mut h.cx()).unwrap();
        assert_eq!(*seen.borrow(), vec![false]);
        assert_eq!(c.phase(), OverlayPhase::Opening);
    }

    #[test]
    fn keys_ignored_while_closing() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();
        let outcome = c
            .handle_key(&KeyEvent::new(KeyCode::Escape), &mut h.cx())
            .unwrap();
        assert_eq!(outcome, EventOutcome::Ignored);
    }

    #[test]
    fn reopen_requested_mid_exit_waits_for_reconcile() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.on_external_open_change(false, &mut h.cx()).unwrap();
        assert_eq!(c.on_external_open_change(true, &mut h.cx()).unwrap(), None);
        assert_eq!(c.phase(), OverlayPhase::Closing);

        c.on_exit_animation_complete(&mut h.cx()).unwrap();
        assert_eq!(c.phase(), OverlayPhase::Closed);
        let change = c.reconcile(&mut h.cx()).unwrap();
        assert_eq!(change.map(|c| c.to), Some(OverlayPhase::Opening));
        assert!(h.doc.is_attached(h.root));
    }

    #[test]
    fn teardown_releases_everything() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        c.teardown(&mut h.cx()).unwrap();
        assert_eq!(c.phase(), OverlayPhase::Closed);
        assert!(h.listeners.is_empty());
        assert!(!h.doc.is_scroll_locked());
        assert!(!h.doc.is_attached(h.backdrop));
        assert_eq!(h.doc.active_element(), Some(h.trigger));
    }

    #[test]
    fn dropping_controller_releases_listeners_and_lock() {
        let mut h = Harness::new(1);
        let mut c = h.controller();
        c.on_external_open_change(true, &mut h.cx()).unwrap();
        drop(c);
        assert!(h.listeners.is_empty());
        assert_eq!(h.scroll_lock.holders(), 0);
    }
}
