//! Logical hardware events delivered into the input subsystem.

use serde::{Deserialize, Serialize};

/// Which column of line-select keys a press came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// A logical event from the terminal hardware.
///
/// The transport layer has already collapsed physical scancodes into this
/// vocabulary; the input subsystem never sees raw key codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A keypad character (see [`is_keypad_char`]).
    Key(char),
    /// Line-select key: side plus 1-based line index (1..=6).
    Lsk(Side, u8),
    /// The CLR key.
    Clr,
    /// The hardware confirm (EXEC) key.
    Confirm,
}

/// Whether `c` belongs to the enumerated keypad set.
///
/// The keypad carries digits, A-Z, `.`, `/`, space, `+`, `-` and `_`.
/// Lowercase letters are not on the panel; the mapping layer upcases before
/// it gets here.
#[must_use]
pub fn is_keypad_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_uppercase() || matches!(c, '.' | '/' | ' ' | '+' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::is_keypad_char;

    #[test]
    fn keypad_accepts_panel_characters() {
        for c in ['0', '9', 'A', 'Z', '.', '/', ' ', '+', '-', '_'] {
            assert!(is_keypad_char(c), "{c:?} should be a keypad char");
        }
    }

    #[test]
    fn keypad_rejects_lowercase_and_controls() {
        for c in ['a', 'z', '\n', '\t', '\u{7f}', '!', '*'] {
            assert!(!is_keypad_char(c), "{c:?} should not be a keypad char");
        }
    }
}
