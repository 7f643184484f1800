//! Draws the published 14x24 frame centered in the terminal.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
};

use cdu_types::{COLS, DisplayFrame, ROWS};

use crate::theme::Palette;

/// Render the display frame as a bordered panel in the middle of the
/// terminal. The engine already pads every row to the display width, so the
/// panel geometry is fixed.
pub fn draw(frame: &mut Frame, display: &DisplayFrame, palette: &Palette) {
    let lines: Vec<Line> = display
        .rows()
        .map(|(text, color)| Line::from(Span::styled(text.to_string(), palette.style_for(color))))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(palette.bezel))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1));

    let width = (COLS as u16).saturating_add(4);
    let height = (ROWS as u16).saturating_add(4);
    let area = frame.area();
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 2),
        width: width.min(area.width),
        height: height.min(area.height),
    };

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
