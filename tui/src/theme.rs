//! Color theme for the CDU display.
//!
//! Single green-phosphor palette in the manner of the real panel, with the
//! annotation colors (valid/invalid/editing) mapped onto it.

use ratatui::style::{Color, Modifier, Style};

use cdu_types::DisplayColor;

/// Phosphor palette constants.
mod colors {
    use super::Color;

    pub const BG_PANEL: Color = Color::Rgb(14, 20, 14);
    pub const BEZEL: Color = Color::Rgb(72, 80, 72);

    pub const PHOSPHOR: Color = Color::Rgb(172, 220, 172);
    pub const PHOSPHOR_DIM: Color = Color::Rgb(104, 138, 104);
    pub const WHITE: Color = Color::Rgb(236, 240, 236);

    pub const GREEN: Color = Color::Rgb(92, 255, 128);
    pub const AMBER: Color = Color::Rgb(255, 184, 80);
    pub const RED: Color = Color::Rgb(255, 102, 102);
    pub const CYAN: Color = Color::Rgb(110, 220, 255);
}

/// Resolved theme palette used by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_panel: Color,
    pub bezel: Color,
    pub text: Color,
    pub label: Color,
    pub title: Color,
    pub valid: Color,
    pub invalid: Color,
    pub editing: Color,
    pub warning: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg_panel: colors::BG_PANEL,
            bezel: colors::BEZEL,
            text: colors::PHOSPHOR,
            label: colors::PHOSPHOR_DIM,
            title: colors::WHITE,
            valid: colors::GREEN,
            invalid: colors::RED,
            editing: colors::CYAN,
            warning: colors::AMBER,
        }
    }
}

impl Palette {
    /// Map a published line color onto a terminal style.
    #[must_use]
    pub fn style_for(&self, color: DisplayColor) -> Style {
        match color {
            DisplayColor::Neutral => Style::default().fg(self.text),
            DisplayColor::Valid => Style::default().fg(self.valid),
            DisplayColor::Invalid => Style::default()
                .fg(self.invalid)
                .add_modifier(Modifier::BOLD),
            DisplayColor::Editing => Style::default().fg(self.editing),
            DisplayColor::Title => Style::default()
                .fg(self.title)
                .add_modifier(Modifier::BOLD),
            DisplayColor::Label => Style::default().fg(self.label),
            DisplayColor::Warning => Style::default()
                .fg(self.warning)
                .add_modifier(Modifier::BOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Palette;
    use cdu_types::DisplayColor;
    use ratatui::style::Modifier;

    #[test]
    fn warning_style_is_bold() {
        let palette = Palette::default();
        let style = palette.style_for(DisplayColor::Warning);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn neutral_and_label_differ() {
        let palette = Palette::default();
        assert_ne!(
            palette.style_for(DisplayColor::Neutral),
            palette.style_for(DisplayColor::Label)
        );
    }
}
