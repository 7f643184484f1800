//! Terminal front end for CDU: rendering and input pumping.

mod input;
mod render;
mod theme;

pub use input::{InputPump, UiEvent, handle_events, map_key};
pub use render::draw;
pub use theme::Palette;
