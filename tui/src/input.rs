//! Input pump: a blocking reader thread feeding a bounded channel, plus the
//! physical-to-logical key mapping.
//!
//! The engine never sees crossterm types; everything is collapsed to
//! [`cdu_types::Event`] here. F1-F6 are the left line-select keys, F7-F12
//! the right ones, Backspace/Delete is CLR and Enter is the EXEC key.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use cdu_engine::{Console, DisplayPublisher, PageStore, RemoteStore};
use cdu_types::{Event, Side, is_keypad_char};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// What a physical event means to the application loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Logical(Event),
    Quit,
    Redraw,
}

enum InputMsg {
    Event(TermEvent),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(&stop2, &tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured sender unblocks.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if the caller exits early; never block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: &Arc<AtomicBool>, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending input into the console. Returns `true` when the operator
/// asked to quit.
pub fn handle_events<R, P, D>(
    console: &mut Console<R, P, D>,
    pump: &mut InputPump,
    now: Instant,
) -> Result<bool>
where
    R: RemoteStore,
    P: PageStore,
    D: DisplayPublisher,
{
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match pump.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        match classify(&ev) {
            Some(UiEvent::Logical(event)) => console.handle_event(event, now),
            Some(UiEvent::Quit) => return Ok(true),
            Some(UiEvent::Redraw) => console.render_current_page(),
            None => {}
        }
        processed += 1;
    }
    Ok(false)
}

fn classify(ev: &TermEvent) -> Option<UiEvent> {
    match ev {
        TermEvent::Key(key) => map_key(*key),
        TermEvent::Resize(..) => Some(UiEvent::Redraw),
        _ => None,
    }
}

/// Map one key press to its logical meaning.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<UiEvent> {
    if matches!(key.kind, KeyEventKind::Release) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }
    match key.code {
        KeyCode::Esc => Some(UiEvent::Quit),
        KeyCode::Backspace | KeyCode::Delete => Some(UiEvent::Logical(Event::Clr)),
        KeyCode::Enter => Some(UiEvent::Logical(Event::Confirm)),
        KeyCode::F(n @ 1..=6) => Some(UiEvent::Logical(Event::Lsk(Side::Left, n))),
        KeyCode::F(n @ 7..=12) => Some(UiEvent::Logical(Event::Lsk(Side::Right, n - 6))),
        KeyCode::Char(c) => {
            let c = c.to_ascii_uppercase();
            if is_keypad_char(c) {
                Some(UiEvent::Logical(Event::Key(c)))
            } else {
                debug!(?c, "key is not on the panel");
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{UiEvent, map_key};
    use cdu_types::{Event, Side};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn letters_are_upcased_to_keypad_chars() {
        assert_eq!(
            map_key(press(KeyCode::Char('a'))),
            Some(UiEvent::Logical(Event::Key('A')))
        );
    }

    #[test]
    fn function_keys_map_to_line_select_keys() {
        assert_eq!(
            map_key(press(KeyCode::F(1))),
            Some(UiEvent::Logical(Event::Lsk(Side::Left, 1)))
        );
        assert_eq!(
            map_key(press(KeyCode::F(12))),
            Some(UiEvent::Logical(Event::Lsk(Side::Right, 6)))
        );
    }

    #[test]
    fn backspace_is_clr_and_enter_is_exec() {
        assert_eq!(
            map_key(press(KeyCode::Backspace)),
            Some(UiEvent::Logical(Event::Clr))
        );
        assert_eq!(
            map_key(press(KeyCode::Enter)),
            Some(UiEvent::Logical(Event::Confirm))
        );
    }

    #[test]
    fn releases_and_off_panel_keys_are_dropped() {
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
        assert_eq!(map_key(press(KeyCode::Char('!'))), None);
    }

    #[test]
    fn ctrl_c_and_esc_quit() {
        assert_eq!(map_key(press(KeyCode::Esc)), Some(UiEvent::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(UiEvent::Quit));
    }
}
