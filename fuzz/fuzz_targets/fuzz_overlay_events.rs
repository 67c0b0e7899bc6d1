#![no_main]

//! Drive a stack of overlays with arbitrary owner calls and host events.
//!
//! Panics on any broken structural invariant: a rendered overlay whose root
//! is detached, listeners outliving the interactive phases, or a scroll lock
//! count that disagrees with the number of rendered overlays.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scrim_core::{
    AnimationEvent, Document, Element, ElementId, ElementTree, Event, KeyCode, KeyEvent,
    ListenerKind, MouseEvent,
};
use scrim_overlay::{AnimationConfig, DismissalConfig, OverlayOptions, OverlayStack};

const OVERLAYS: usize = 3;

#[derive(Debug, Arbitrary)]
enum Key {
    Escape,
    Tab,
    BackTab,
    Enter,
}

#[derive(Debug, Arbitrary)]
enum Action {
    SetOpen { overlay: u8, open: bool },
    Close { overlay: u8 },
    Dismissal { overlay: u8, backdrop: bool, escape: bool },
    Key(Key),
    Click { element: u8 },
    AnimationEnd { element: u8 },
    HostFocus { element: u8 },
    HostDetach { element: u8 },
    Advance { millis: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    uncontrolled: [bool; OVERLAYS],
    reduced_motion: bool,
    controls: [u8; OVERLAYS],
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let mut doc = ElementTree::new();
    let trigger = doc.create_child(doc.body(), Element::button()).unwrap();
    let _ = doc.focus(trigger);

    let mut elements: Vec<ElementId> = vec![trigger];
    let mut roots = Vec::new();
    let mut options = Vec::new();
    for i in 0..OVERLAYS {
        let backdrop = doc.create(Element::container());
        let root = doc.create_child(backdrop, Element::container()).unwrap();
        for _ in 0..(input.controls[i] % 5) {
            elements.push(doc.create_child(root, Element::button()).unwrap());
        }
        elements.extend([backdrop, root]);
        roots.push(root);

        let mut opts = OverlayOptions::new(backdrop, root)
            .animation(AnimationConfig::default().reduced_motion(input.reduced_motion));
        if input.uncontrolled[i] {
            opts = opts.uncontrolled();
        }
        options.push(opts);
    }

    let now = Rc::new(Cell::new(web_time::Instant::now()));
    let reader = Rc::clone(&now);
    let mut stack = OverlayStack::with_clock(doc, Box::new(move || reader.get()));
    let ids: Vec<_> = options
        .into_iter()
        .map(|opts| stack.mount(opts).unwrap())
        .collect();

    let pick = |index: u8| elements[usize::from(index) % elements.len()];

    for action in input.actions.iter().take(256) {
        // Host detaching overlay internals may make later mutations fail;
        // errors are fine, panics are not.
        let _ = match *action {
            Action::SetOpen { overlay, open } => stack
                .set_open(ids[usize::from(overlay) % OVERLAYS], open)
                .map(|_| ()),
            Action::Close { overlay } => stack
                .close(ids[usize::from(overlay) % OVERLAYS])
                .map(|_| ()),
            Action::Dismissal {
                overlay,
                backdrop,
                escape,
            } => stack.set_dismissal(
                ids[usize::from(overlay) % OVERLAYS],
                DismissalConfig::none()
                    .close_on_backdrop_click(backdrop)
                    .close_on_escape(escape),
            ),
            Action::Key(ref key) => {
                let code = match key {
                    Key::Escape => KeyCode::Escape,
                    Key::Tab => KeyCode::Tab,
                    Key::BackTab => KeyCode::BackTab,
                    Key::Enter => KeyCode::Enter,
                };
                stack.handle_event(&Event::Key(KeyEvent::new(code))).map(|_| ())
            }
            Action::Click { element } => stack
                .handle_event(&Event::Mouse(MouseEvent::click(pick(element))))
                .map(|_| ()),
            Action::AnimationEnd { element } => stack
                .handle_event(&Event::AnimationEnd(AnimationEvent::new(pick(element))))
                .map(|_| ()),
            Action::HostFocus { element } => {
                let _ = stack.document_mut().focus(pick(element));
                Ok(())
            }
            Action::HostDetach { element } => {
                // Only the page trigger; overlay subtrees belong to the stack.
                if pick(element) == trigger {
                    let _ = stack.document_mut().detach(trigger);
                }
                Ok(())
            }
            Action::Advance { millis } => {
                now.set(now.get() + Duration::from_millis(u64::from(millis)));
                stack.tick().map(|_| ())
            }
        };

        let mut rendered = 0;
        for (i, &id) in ids.iter().enumerate() {
            let phase = stack.phase(id).unwrap();
            assert_eq!(phase.is_rendered(), stack.document().is_attached(roots[i]));
            assert_eq!(
                phase.is_interactive(),
                stack.listeners().is_listening(id.id(), ListenerKind::KeyDown)
            );
            rendered += usize::from(phase.is_rendered());
        }
        assert_eq!(stack.scroll_lock().holders(), rendered);
        assert_eq!(stack.document().is_scroll_locked(), rendered > 0);
    }
});
