//! The 14x24 display model and the fixed message vocabulary.

use serde::{Deserialize, Serialize};

use crate::text::fit_to_width;

/// Display height in lines.
pub const ROWS: usize = 14;
/// Display width in columns.
pub const COLS: usize = 24;
/// Bottom line, owned by the scratchpad.
pub const SCRATCHPAD_ROW: usize = 13;
/// Transient error/success overlays render here, never on the scratchpad line.
pub const ANNUNCIATOR_ROW: usize = 12;

/// Color class of a published line.
///
/// The first four mirror the scratchpad annotation states; the rest are used
/// by page composition. The front end maps these to actual terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayColor {
    #[default]
    Neutral,
    Valid,
    Invalid,
    Editing,
    Title,
    Label,
    Warning,
}

/// A full 14-line frame ready for publication.
///
/// Every line is clipped or padded to exactly [`COLS`] characters, so the
/// front end never has to reason about widths.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    lines: [(String, DisplayColor); ROWS],
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self {
            lines: core::array::from_fn(|_| (" ".repeat(COLS), DisplayColor::Neutral)),
        }
    }
}

impl DisplayFrame {
    /// Set one row, clipping/padding the text to the display width.
    pub fn set(&mut self, row: usize, text: &str, color: DisplayColor) {
        if row >= ROWS {
            return;
        }
        self.lines[row] = (fit_to_width(text, COLS), color);
    }

    pub fn blank(&mut self, row: usize) {
        self.set(row, "", DisplayColor::Neutral);
    }

    #[must_use]
    pub fn line(&self, row: usize) -> Option<(&str, DisplayColor)> {
        self.lines.get(row).map(|(text, color)| (text.as_str(), *color))
    }

    /// Row text without trailing padding, for assertions and logs.
    #[must_use]
    pub fn text(&self, row: usize) -> &str {
        self.lines
            .get(row)
            .map_or("", |(text, _)| text.trim_end_matches(' '))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, DisplayColor)> {
        self.lines.iter().map(|(text, color)| (text.as_str(), *color))
    }
}

/// Fixed-vocabulary tokens shown to the operator.
///
/// User-visible failures never carry technical detail; they render as one of
/// these short tokens.
pub mod tokens {
    pub const FORMAT_ERROR: &str = "FORMAT ERROR";
    pub const OUT_OF_RANGE: &str = "ENTRY OUT OF RANGE";
    pub const BUFFER_FULL: &str = "BUFFER FULL";
    pub const WRITE_FAILED: &str = "WRITE FAILED";
    pub const ENTRY_ACCEPTED: &str = "ENTRY ACCEPTED";
    pub const ENTRY_REQUIRED: &str = "ENTRY REQUIRED";
    pub const RETURNING_HOME: &str = "RETURNING TO HOME";
    pub const EXEC_REQUIRED: &str = "EXEC REQUIRED";
    pub const INVALID_TIME: &str = "INVALID TIME";
    pub const INVALID_DATE: &str = "INVALID DATE";
    pub const INVALID_SELECTION: &str = "INVALID SELECTION";
    pub const INVALID_INCREMENT: &str = "INVALID INCREMENT";
    pub const VALIDATION_FAILED: &str = "VALIDATION FAILED";
    pub const TIME_TOO_EARLY: &str = "TIME TOO EARLY";
    pub const NOT_ARMED: &str = "SYSTEM NOT ARMED";
}
