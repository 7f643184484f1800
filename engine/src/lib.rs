//! Core engine for CDU - the input and confirmation state machine.
//!
//! This crate has no TUI dependencies. The event loop feeds logical events
//! and the current `Instant` into [`Console`]; everything else — the
//! scratchpad with two-stage error recovery, metadata-driven line-select
//! dispatch, the three-tier validation pipeline and the modal confirmation
//! dialogs — happens behind the ports in [`ports`].

mod compose;
mod console;
mod dialog;
mod ports;
mod scratchpad;
mod timer;
mod validation;


pub use console::{Console, InputMode};
pub use dialog::{ConfirmationDialog, DialogDisposition, DialogKind};
pub use ports::{
    DialogAction, DisplayPublisher, FrameBuffer, MemoryStore, PageStore, RemoteStore, StaticPages,
    ValueAccessor,
};
pub use scratchpad::{AppendOutcome, CAPACITY, ClearOutcome, Scratchpad, ScratchTick};
pub use timer::Deadline;
pub use validation::{
    CustomRule, LaterThanReference, NotAboveReference, RequiresGuard, TypedValue, ValidationEngine,
};
