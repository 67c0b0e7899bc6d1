#![forbid(unsafe_code)]

//! scrim: accessible overlays (modals, bottom sheets, side sheets) driven by
//! one lifecycle controller.
//!
//! Most applications only need the [`prelude`]:
//!
//! ```
//! use scrim::prelude::*;
//!
//! let mut doc = ElementTree::new();
//! let trigger = doc.create_child(doc.body(), Element::button()).unwrap();
//! let backdrop = doc.create(Element::container());
//! let sheet = doc.create_child(backdrop, Element::container()).unwrap();
//! doc.create_child(sheet, Element::button().with_label("Share")).unwrap();
//! doc.focus(trigger).unwrap();
//!
//! let mut stack = OverlayStack::new(doc);
//! let id = stack
//!     .mount(
//!         OverlayOptions::new(backdrop, sheet)
//!             .shell(BottomSheetShell::new(SheetHeight::Half))
//!             .uncontrolled(),
//!     )
//!     .unwrap();
//!
//! stack.set_open(id, true).unwrap();
//! stack.handle_event(&Event::Mouse(MouseEvent::click(backdrop))).unwrap();
//! stack
//!     .handle_event(&Event::AnimationEnd(AnimationEvent::new(sheet)))
//!     .unwrap();
//!
//! assert_eq!(stack.phase(id), Some(OverlayPhase::Closed));
//! assert_eq!(stack.document().active_element(), Some(trigger));
//! ```
//!
//! # Crates
//!
//! - [`core`]: host abstraction (events, documents, listeners).
//! - [`overlay`]: controller, focus trap, dismissal, scroll lock, shells.

pub use scrim_core as core;
pub use scrim_overlay as overlay;

#[cfg(feature = "tracing-json")]
pub use scrim_core::logging::init_json_logging;

pub mod prelude {
    //! Common imports.

    pub use scrim_core::{
        AnimationEvent, Controlled, Document, DocumentError, Element, ElementId, ElementKind,
        ElementTree, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent,
        MouseEventKind,
    };
    pub use scrim_overlay::{
        AnimationConfig, BottomSheetShell, CloseRequest, DismissReason, DismissalConfig,
        EventOutcome, ModalShell, ModalSize, OverlayConfig, OverlayController, OverlayError,
        OverlayId, OverlayOptions, OverlayPhase, OverlayShell, OverlayStack, SheetHeight,
        SheetWidth, Side, SideSheetShell,
    };
}
