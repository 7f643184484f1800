//! Core domain types for CDU.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod display;
mod event;
mod page;
mod text;
mod validation;
mod value;

pub use display::{
    ANNUNCIATOR_ROW, COLS, DisplayColor, DisplayFrame, ROWS, SCRATCHPAD_ROW, tokens,
};
pub use event::{Event, Side, is_keypad_char};
pub use page::{
    ButtonAction, ButtonConfig, ButtonKind, DisplayConfig, FieldConfig, LineConfig, PageConfig,
    PageId, PageTemplates, TemplateError,
};
pub use text::{center, fit_to_width, format_number, wrap_to_width};
pub use validation::{InputType, ValidationRule, Verdict};
pub use value::{DatapointKind, DatapointMetadata, Quality, RemoteValue, Value};

use thiserror::Error;

/// Failure talking to the remote value store.
///
/// These are caught at the dispatch boundary and rendered as a fixed
/// vocabulary token; they never propagate out of an input handler.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("address {0} is not known to the remote store")]
    UnknownAddress(String),
    #[error("address {0} rejected the write")]
    WriteRejected(String),
    #[error("remote link unavailable")]
    LinkDown,
}
