//! Modal confirmation dialogs: soft, hard, and countdown variants.
//!
//! A dialog fully replaces page rendering while active. Soft dialogs accept
//! the confirm line-key or the hardware EXEC key; hard dialogs accept EXEC
//! only and flash at anything else that could look like a decision; countdown
//! dialogs behave like soft ones but confirm themselves when the timer runs
//! out.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use cdu_types::{COLS, DisplayColor, DisplayFrame, Event, Side, center, tokens, wrap_to_width};

use crate::ports::{DialogAction, DisplayPublisher};
use crate::timer::Deadline;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
const WRONG_KEY_FLASH: Duration = Duration::from_millis(1500);
const MAX_DETAIL_ROWS: usize = 7;

/// Line-select keys designated for dialog response.
const CONFIRM_LSK: (Side, u8) = (Side::Right, 6);
const CANCEL_LSK: (Side, u8) = (Side::Left, 6);

const TITLE_ROW: usize = 0;
const WARNING_ROW: usize = 1;
const DETAIL_START_ROW: usize = 3;
const INSTRUCTION_ROW: usize = 11;
const STATUS_ROW: usize = 12;
// Row 13 is reserved blank while a dialog is active.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Soft,
    Hard,
    Countdown,
}

/// How the dialog engine disposed of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogDisposition {
    /// No dialog is active; the event belongs to normal input handling.
    NotActive,
    /// Event consumed; the dialog stays open.
    Consumed,
    /// Event consumed and the dialog closed; the page needs a redraw.
    Closed,
}

struct ActiveDialog {
    kind: DialogKind,
    title: String,
    warning: Option<String>,
    details: Vec<String>,
    action: Option<Box<dyn DialogAction>>,
    countdown_remaining: Option<u32>,
    tick: Deadline,
    flash: Option<&'static str>,
    flash_clear: Deadline,
}

/// The one modal dialog slot of the terminal.
#[derive(Default)]
pub struct ConfirmationDialog {
    active: Option<ActiveDialog>,
}

impl ConfirmationDialog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn kind(&self) -> Option<DialogKind> {
        self.active.as_ref().map(|active| active.kind)
    }

    pub fn show_soft(
        &mut self,
        title: impl Into<String>,
        details: Vec<String>,
        action: Option<Box<dyn DialogAction>>,
        display: &mut dyn DisplayPublisher,
    ) {
        self.install(
            ActiveDialog {
                kind: DialogKind::Soft,
                title: title.into(),
                warning: None,
                details,
                action,
                countdown_remaining: None,
                tick: Deadline::default(),
                flash: None,
                flash_clear: Deadline::default(),
            },
            display,
        );
    }

    pub fn show_hard(
        &mut self,
        title: impl Into<String>,
        warning: impl Into<String>,
        details: Vec<String>,
        action: Option<Box<dyn DialogAction>>,
        display: &mut dyn DisplayPublisher,
    ) {
        self.install(
            ActiveDialog {
                kind: DialogKind::Hard,
                title: title.into(),
                warning: Some(warning.into()),
                details,
                action,
                countdown_remaining: None,
                tick: Deadline::default(),
                flash: None,
                flash_clear: Deadline::default(),
            },
            display,
        );
    }

    pub fn show_countdown(
        &mut self,
        title: impl Into<String>,
        details: Vec<String>,
        seconds: u32,
        action: Option<Box<dyn DialogAction>>,
        now: Instant,
        display: &mut dyn DisplayPublisher,
    ) {
        let mut tick = Deadline::default();
        tick.arm(now, COUNTDOWN_TICK);
        self.install(
            ActiveDialog {
                kind: DialogKind::Countdown,
                title: title.into(),
                warning: None,
                details,
                action,
                countdown_remaining: Some(seconds.max(1)),
                tick,
                flash: None,
                flash_clear: Deadline::default(),
            },
            display,
        );
    }

    fn install(&mut self, dialog: ActiveDialog, display: &mut dyn DisplayPublisher) {
        // Always tear down prior state (and its timers) before installing.
        if self.active.take().is_some() {
            debug!("replacing active dialog");
        }
        self.active = Some(dialog);
        self.render(display);
    }

    /// Route one event. Everything is consumed while a dialog is active;
    /// only the designated keys do anything.
    pub fn handle_event(
        &mut self,
        event: &Event,
        now: Instant,
        display: &mut dyn DisplayPublisher,
    ) -> DialogDisposition {
        let Some(kind) = self.kind() else {
            return DialogDisposition::NotActive;
        };
        match event {
            Event::Confirm => {
                self.finish(true);
                DialogDisposition::Closed
            }
            Event::Lsk(side, line) if (*side, *line) == CONFIRM_LSK => match kind {
                DialogKind::Soft | DialogKind::Countdown => {
                    self.finish(true);
                    DialogDisposition::Closed
                }
                // Hard dialogs commit on the hardware key only.
                DialogKind::Hard => DialogDisposition::Consumed,
            },
            Event::Lsk(side, line) if (*side, *line) == CANCEL_LSK => match kind {
                DialogKind::Soft | DialogKind::Countdown => {
                    self.finish(false);
                    DialogDisposition::Closed
                }
                DialogKind::Hard => {
                    if let Some(active) = self.active.as_mut() {
                        active.flash = Some(tokens::EXEC_REQUIRED);
                        active.flash_clear.arm(now, WRONG_KEY_FLASH);
                    }
                    self.render(display);
                    DialogDisposition::Consumed
                }
            },
            _ => DialogDisposition::Consumed,
        }
    }

    /// Drive the owned deadlines. Returns `true` when the dialog closed
    /// (countdown auto-confirm) and the page needs a redraw.
    pub fn tick(&mut self, now: Instant, display: &mut dyn DisplayPublisher) -> bool {
        let mut rerender = false;
        let mut auto_confirm = false;
        {
            let Some(active) = self.active.as_mut() else {
                return false;
            };
            if active.flash_clear.fire(now) {
                active.flash = None;
                rerender = true;
            }
            if active.tick.fire(now) {
                let remaining = active.countdown_remaining.unwrap_or(1).saturating_sub(1);
                active.countdown_remaining = Some(remaining);
                if remaining == 0 {
                    auto_confirm = true;
                } else {
                    active.tick.arm(now, COUNTDOWN_TICK);
                    rerender = true;
                }
            }
        }
        if auto_confirm {
            self.finish(true);
            return true;
        }
        if rerender {
            self.render(display);
        }
        false
    }

    /// Idempotent teardown without invoking either callback.
    ///
    /// Returns `true` if a dialog was actually dismissed, so the caller
    /// knows to redraw the page underneath.
    pub fn clear(&mut self) -> bool {
        match self.active.take() {
            Some(mut active) => {
                active.tick.cancel();
                active.flash_clear.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop timers, run the action, drop the dialog. An erring action is
    /// logged; the dialog never stays open because of it.
    fn finish(&mut self, confirmed: bool) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.tick.cancel();
        active.flash_clear.cancel();
        if let Some(action) = active.action.as_mut() {
            let result = if confirmed {
                action.confirm()
            } else {
                action.cancel()
            };
            if let Err(err) = result {
                warn!(confirmed, %err, "dialog action failed");
            }
        }
    }

    /// Publish the fixed 14-line dialog layout.
    fn render(&self, display: &mut dyn DisplayPublisher) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let mut frame = DisplayFrame::default();
        frame.set(TITLE_ROW, &center(&active.title, COLS), DisplayColor::Title);
        if let Some(warning) = &active.warning {
            frame.set(WARNING_ROW, &center(warning, COLS), DisplayColor::Warning);
        }
        frame.set(WARNING_ROW + 1, &"-".repeat(COLS), DisplayColor::Label);

        let wrapped = active
            .details
            .iter()
            .flat_map(|detail| wrap_to_width(detail, COLS))
            .take(MAX_DETAIL_ROWS);
        for (offset, line) in wrapped.enumerate() {
            frame.set(DETAIL_START_ROW + offset, &line, DisplayColor::Neutral);
        }
        frame.set(INSTRUCTION_ROW - 1, &"-".repeat(COLS), DisplayColor::Label);

        let instruction = match active.kind {
            DialogKind::Soft => "CONFIRM OR CANCEL BELOW".to_string(),
            DialogKind::Hard => "PRESS EXEC TO CONFIRM".to_string(),
            DialogKind::Countdown => {
                let remaining = active.countdown_remaining.unwrap_or(0);
                format!("AUTO CONFIRM IN {remaining}S")
            }
        };
        frame.set(INSTRUCTION_ROW, &instruction, DisplayColor::Label);

        if let Some(flash) = active.flash {
            frame.set(STATUS_ROW, flash, DisplayColor::Warning);
        } else if matches!(active.kind, DialogKind::Soft | DialogKind::Countdown) {
            frame.set(
                STATUS_ROW,
                &options_line("<CANCEL", "CONFIRM>"),
                DisplayColor::Label,
            );
        }
        // Row 13 stays blank for the whole life of the dialog.
        display.publish_full(&frame);
    }
}

fn options_line(left: &str, right: &str) -> String {
    let pad = COLS.saturating_sub(left.chars().count() + right.chars().count());
    format!("{left}{}{right}", " ".repeat(pad))
}
