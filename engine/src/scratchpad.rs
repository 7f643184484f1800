//! The scratchpad: the terminal's single-line entry buffer.
//!
//! Two-stage error recovery is the load-bearing behavior here: a rejected
//! entry replaces the buffer with an error token, and the first CLR restores
//! exactly what the operator had typed. Only a second CLR actually empties
//! the buffer.

use std::mem;
use std::time::{Duration, Instant};

use tracing::trace;

use cdu_types::{
    ANNUNCIATOR_ROW, COLS, DisplayColor, InputType, SCRATCHPAD_ROW, ValidationRule, Value,
    Verdict, tokens,
};

use crate::ports::DisplayPublisher;
use crate::timer::Deadline;
use crate::validation::{check_time, number_constraints, parse_strict_number, text_constraints};

/// Maximum entry length in characters.
pub const CAPACITY: usize = 20;

const RENDER_DEBOUNCE: Duration = Duration::from_millis(80);
const ERROR_OVERLAY: Duration = Duration::from_millis(3000);
const SUCCESS_OVERLAY: Duration = Duration::from_millis(2000);

/// Trailing marker shown after typed content.
const ENTRY_MARKER: char = '\u{25a1}'; // □

/// Buffer occupancy, as one closed state.
///
/// `ErrorShown` carries both the displayed token and the content to restore,
/// so "an error is showing" and "there is something to restore" cannot drift
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Entry {
    #[default]
    Clean,
    Editing(String),
    ErrorShown {
        message: String,
        saved: String,
    },
}

/// What a [`Scratchpad::clear`] call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// First CLR after a rejection: the pre-error content is back.
    Restored,
    /// Real clear: the buffer is now empty.
    Cleared,
}

/// Outcome of an append attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// Buffer at capacity; content unchanged. `warn` is set on the first
    /// rejection of an overflow streak only.
    Full { warn: bool },
}

/// Effects of a [`Scratchpad::tick`] call the owner must act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScratchTick {
    /// A transient overlay expired; the page should be redrawn.
    pub overlay_expired: bool,
}

#[derive(Debug, Default)]
pub struct Scratchpad {
    entry: Entry,
    color: DisplayColor,
    note: Option<String>,
    buffer_full_warned: bool,
    render_after: Deadline,
    overlay_clear: Deadline,
}

impl Scratchpad {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently occupying the buffer (the error token while one shows).
    #[must_use]
    pub fn content(&self) -> &str {
        match &self.entry {
            Entry::Clean => "",
            Entry::Editing(text) => text,
            Entry::ErrorShown { message, .. } => message,
        }
    }

    /// Typed entry text, only while the operator is editing.
    #[must_use]
    pub fn entry_text(&self) -> Option<&str> {
        match &self.entry {
            Entry::Editing(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_showing(&self) -> bool {
        matches!(self.entry, Entry::ErrorShown { .. })
    }

    /// Whether CLR has anything to act on here.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.error_showing() || !self.content().is_empty()
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Append one keypad character.
    ///
    /// A keystroke while an error token is showing acknowledges the error:
    /// the saved content is restored first, then the character lands on it.
    /// Every accepted keystroke resets the annotation to neutral.
    pub fn append(&mut self, c: char) -> AppendOutcome {
        let mut text = match mem::take(&mut self.entry) {
            Entry::Clean => String::new(),
            Entry::Editing(text) => text,
            Entry::ErrorShown { saved, .. } => saved,
        };
        if text.chars().count() >= CAPACITY {
            self.entry = Entry::Editing(text);
            let warn = !self.buffer_full_warned;
            self.buffer_full_warned = true;
            return AppendOutcome::Full { warn };
        }
        text.push(c);
        self.entry = Entry::Editing(text);
        self.color = DisplayColor::Neutral;
        self.note = None;
        AppendOutcome::Appended
    }

    /// Two-phase clear.
    ///
    /// While an error is showing, the first call restores the saved content;
    /// otherwise the buffer is actually emptied and the full-buffer latch
    /// resets.
    pub fn clear(&mut self) -> ClearOutcome {
        match mem::take(&mut self.entry) {
            Entry::ErrorShown { saved, .. } => {
                self.entry = Entry::Editing(saved);
                self.color = DisplayColor::Neutral;
                self.note = None;
                ClearOutcome::Restored
            }
            _ => {
                self.force_clear();
                ClearOutcome::Cleared
            }
        }
    }

    /// Unconditional real clear, bypassing error recovery.
    pub fn force_clear(&mut self) {
        self.entry = Entry::Clean;
        self.color = DisplayColor::Neutral;
        self.note = None;
        self.buffer_full_warned = false;
    }

    /// Overwrite the buffer with an existing value for editing.
    pub fn set(&mut self, value: &Value) {
        self.entry = Entry::Editing(value.display());
        self.color = DisplayColor::Editing;
    }

    /// Replace the buffer with an error token, keeping the current content
    /// for the first CLR to restore.
    pub fn show_error(&mut self, token: &str, display: &mut dyn DisplayPublisher) {
        let saved = match mem::take(&mut self.entry) {
            Entry::Editing(text) => text,
            // A second rejection keeps the original entry recoverable.
            Entry::ErrorShown { saved, .. } => saved,
            Entry::Clean => String::new(),
        };
        trace!(token, "scratchpad error shown");
        self.entry = Entry::ErrorShown {
            message: token.to_string(),
            saved,
        };
        self.render_now(display);
    }

    /// Annotate the current content as valid/invalid.
    pub fn set_valid(&mut self, valid: bool, note: Option<String>) {
        self.color = if valid {
            DisplayColor::Valid
        } else {
            DisplayColor::Invalid
        };
        self.note = note;
    }

    /// Request a debounced re-render; only the last request in a burst
    /// actually publishes.
    pub fn request_render(&mut self, now: Instant) {
        self.render_after.arm(now, RENDER_DEBOUNCE);
    }

    /// Publish immediately, cancelling any pending debounce.
    pub fn render_now(&mut self, display: &mut dyn DisplayPublisher) {
        self.render_after.cancel();
        let (text, color) = self.display_form();
        display.publish_line(SCRATCHPAD_ROW, &text, color);
    }

    /// Current display form of the buffer line.
    #[must_use]
    pub fn display_form(&self) -> (String, DisplayColor) {
        match &self.entry {
            Entry::Clean => ("-".repeat(COLS), DisplayColor::Neutral),
            Entry::Editing(text) => (format!("{text}{ENTRY_MARKER}"), self.color),
            Entry::ErrorShown { message, .. } => (message.clone(), DisplayColor::Invalid),
        }
    }

    /// Transient error overlay on the annunciator row, auto-reverting.
    pub fn flash_error(&mut self, now: Instant, display: &mut dyn DisplayPublisher, token: &str) {
        self.flash(now, display, token, DisplayColor::Warning, ERROR_OVERLAY);
    }

    /// Transient success/notice overlay on the annunciator row.
    pub fn flash_notice(&mut self, now: Instant, display: &mut dyn DisplayPublisher, token: &str) {
        self.flash(now, display, token, DisplayColor::Valid, SUCCESS_OVERLAY);
    }

    fn flash(
        &mut self,
        now: Instant,
        display: &mut dyn DisplayPublisher,
        token: &str,
        color: DisplayColor,
        revert_after: Duration,
    ) {
        // Re-arming cancels the previous overlay's revert.
        self.overlay_clear.arm(now, revert_after);
        display.publish_line(ANNUNCIATOR_ROW, token, color);
    }

    /// Drive the owned deadlines. The owner redraws the page when an overlay
    /// expires (the redraw reclaims the annunciator row).
    pub fn tick(&mut self, now: Instant, display: &mut dyn DisplayPublisher) -> ScratchTick {
        if self.render_after.fire(now) {
            let (text, color) = self.display_form();
            display.publish_line(SCRATCHPAD_ROW, &text, color);
        }
        ScratchTick {
            overlay_expired: self.overlay_clear.fire(now),
        }
    }

    /// Stateless check of the current content against a field rule.
    ///
    /// This is the quick per-field check; the full three-tier pipeline lives
    /// in the validation engine.
    #[must_use]
    pub fn validate(&self, rule: &ValidationRule) -> Verdict {
        let text = self.content();
        if text.is_empty() {
            return if rule.required {
                Verdict::fail(tokens::ENTRY_REQUIRED)
            } else {
                Verdict::Pass
            };
        }
        match rule.input_type {
            InputType::Numeric => validate_number(text, rule),
            InputType::Time => {
                if check_time(text) {
                    Verdict::Pass
                } else {
                    Verdict::fail(tokens::INVALID_TIME)
                }
            }
            InputType::Select => {
                if rule.options.iter().any(|option| option == text) {
                    Verdict::Pass
                } else {
                    Verdict::fail(tokens::INVALID_SELECTION)
                }
            }
            InputType::Text | InputType::Date => text_constraints(text, rule),
        }
    }
}

fn validate_number(text: &str, rule: &ValidationRule) -> Verdict {
    // A lone minus is a valid in-progress entry, not a format error.
    if text == "-" {
        return Verdict::Pass;
    }
    let Some(value) = parse_strict_number(text) else {
        return Verdict::fail(tokens::FORMAT_ERROR);
    };
    number_constraints(value, rule)
}
