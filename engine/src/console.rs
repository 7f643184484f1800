//! The console: mode state machine, key routing and metadata-driven
//! dispatch.
//!
//! This is the event dispatcher the transport layer talks to. One instance
//! owns the terminal's singletons — scratchpad, dialog, mode — plus the
//! ports, injected at construction so independent instances are testable in
//! isolation. Every public operation is total: it always completes and
//! never raises; remote and configuration failures are logged and rendered
//! as display tokens.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use cdu_types::{
    ButtonAction, DatapointKind, DatapointMetadata, Event, PageId, SCRATCHPAD_ROW, Side,
    ValidationRule, Value, Verdict, is_keypad_char, tokens,
};

use crate::compose::compose_page;
use crate::dialog::{ConfirmationDialog, DialogDisposition};
use crate::ports::{DialogAction, DisplayPublisher, PageStore, RemoteStore};
use crate::scratchpad::{AppendOutcome, ClearOutcome, Scratchpad};
use crate::validation::{ValidationEngine, parse_strict_number};

/// Two CLR presses inside this window trigger the emergency exit.
const DOUBLE_CLR_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Input,
}

/// Owned result of resolving a line-select key against the active page.
enum LskTarget {
    Button(ButtonTarget),
    Datapoint {
        address: String,
        rule: Option<ValidationRule>,
    },
    None,
}

enum ButtonTarget {
    Navigate(PageId),
    Datapoint(String),
}

pub struct Console<R, P, D> {
    remote: R,
    pages: P,
    display: D,
    scratchpad: Scratchpad,
    dialog: ConfirmationDialog,
    validation: ValidationEngine,
    mode: InputMode,
    mode_changed: Option<Instant>,
    last_clr: Option<Instant>,
    active_page: PageId,
}

impl<R: RemoteStore, P: PageStore, D: DisplayPublisher> Console<R, P, D> {
    pub fn new(remote: R, pages: P, display: D) -> Self {
        let active_page = pages.root().clone();
        let mut console = Self {
            remote,
            pages,
            display,
            scratchpad: Scratchpad::new(),
            dialog: ConfirmationDialog::new(),
            validation: ValidationEngine::new(),
            mode: InputMode::Normal,
            mode_changed: None,
            last_clr: None,
            active_page,
        };
        console.render_current_page();
        console
    }

    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    #[must_use]
    pub fn active_page(&self) -> &PageId {
        &self.active_page
    }

    #[must_use]
    pub fn scratchpad(&self) -> &Scratchpad {
        &self.scratchpad
    }

    #[must_use]
    pub fn dialog(&self) -> &ConfirmationDialog {
        &self.dialog
    }

    #[must_use]
    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// Registry access for installing custom validation rules.
    pub fn validation_mut(&mut self) -> &mut ValidationEngine {
        &mut self.validation
    }

    // ------------------------------------------------------------------
    // Event entry points
    // ------------------------------------------------------------------

    /// Route one hardware event: an active dialog consumes everything, the
    /// rest goes to normal input handling.
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match self.dialog.handle_event(&event, now, &mut self.display) {
            DialogDisposition::NotActive => {}
            DialogDisposition::Consumed => return,
            DialogDisposition::Closed => {
                self.render_current_page();
                return;
            }
        }
        match event {
            Event::Key(c) => self.handle_key_input(c, now),
            Event::Lsk(side, line) => self.handle_lsk(side, line, now),
            Event::Clr => self.handle_clr(now),
            // EXEC means nothing outside a dialog.
            Event::Confirm => {}
        }
    }

    /// Drive every owned deadline.
    pub fn tick(&mut self, now: Instant) {
        if self.dialog.tick(now, &mut self.display) {
            self.render_current_page();
        }
        if self.dialog.is_active() {
            // The dialog owns the whole frame; buffer timers wait.
            return;
        }
        let effects = self.scratchpad.tick(now, &mut self.display);
        if effects.overlay_expired {
            self.render_current_page();
        }
    }

    /// Keypad character entry.
    pub fn handle_key_input(&mut self, c: char, now: Instant) {
        if !is_keypad_char(c) {
            debug!(?c, "ignoring non-keypad character");
            return;
        }
        match self.mode {
            InputMode::Normal => {
                self.mode = InputMode::Input;
                self.mode_changed = Some(now);
            }
            InputMode::Input => self.mode_changed = Some(now),
        }
        match self.scratchpad.append(c) {
            AppendOutcome::Appended | AppendOutcome::Full { warn: false } => {}
            AppendOutcome::Full { warn: true } => {
                self.scratchpad
                    .flash_error(now, &mut self.display, tokens::BUFFER_FULL);
            }
        }
        self.scratchpad.request_render(now);
    }

    /// CLR priority ladder; first match wins.
    pub fn handle_clr(&mut self, now: Instant) {
        // Priority 0: double-press emergency exit.
        if let Some(previous) = self.last_clr
            && now.duration_since(previous) <= DOUBLE_CLR_WINDOW
        {
            // Reset the window so the following single CLR is just a CLR.
            self.last_clr = None;
            self.scratchpad.force_clear();
            self.mode = InputMode::Normal;
            self.active_page = self.pages.root().clone();
            self.render_current_page();
            self.scratchpad
                .flash_notice(now, &mut self.display, tokens::RETURNING_HOME);
            return;
        }
        // Priority 1: the buffer.
        if self.scratchpad.has_content() {
            self.last_clr = Some(now);
            if self.scratchpad.clear() == ClearOutcome::Cleared {
                self.mode = InputMode::Normal;
            }
            self.scratchpad.render_now(&mut self.display);
            return;
        }
        // Priority 2: parent navigation.
        let parent = self
            .pages
            .page(&self.active_page)
            .and_then(|page| page.parent.clone());
        if let Some(parent) = parent {
            self.last_clr = Some(now);
            self.switch_to_page(&parent);
        }
        // Priority 3: nothing to act on.
    }

    /// Line-select key press.
    pub fn handle_lsk(&mut self, side: Side, line: u8, now: Instant) {
        let target = self.resolve_lsk(side, line);
        match target {
            LskTarget::Button(ButtonTarget::Navigate(page)) => self.switch_to_page(&page),
            LskTarget::Button(ButtonTarget::Datapoint(address)) => {
                self.dispatch_datapoint(&address, None, now);
            }
            LskTarget::Datapoint { address, rule } => {
                self.dispatch_datapoint(&address, rule, now);
            }
            LskTarget::None => {}
        }
    }

    fn resolve_lsk(&self, side: Side, line: u8) -> LskTarget {
        let Some(page) = self.pages.page(&self.active_page) else {
            warn!(page = %self.active_page, "active page has no configuration");
            return LskTarget::None;
        };
        let Some(line_config) = page.line(line) else {
            warn!(page = %self.active_page, line, "line not configured");
            return LskTarget::None;
        };
        let field = line_config.side(side);
        if let Some(button) = &field.button
            && let Some(action) = button.actionable()
        {
            return LskTarget::Button(match action {
                ButtonAction::Navigate(target) => ButtonTarget::Navigate(PageId::new(target)),
                ButtonAction::Datapoint(target) => ButtonTarget::Datapoint(target.to_string()),
            });
        }
        if let Some(display) = &field.display
            && let Some(source) = display.source.as_deref()
        {
            return LskTarget::Datapoint {
                address: source.to_string(),
                rule: display.rule.clone(),
            };
        }
        LskTarget::None
    }

    /// The single metadata dispatch site.
    fn dispatch_datapoint(&mut self, address: &str, rule: Option<ValidationRule>, now: Instant) {
        let Some(meta) = self.remote.metadata(address) else {
            debug!(address, "no metadata cached; ignoring press");
            return;
        };
        if !meta.writable {
            debug!(address, "datapoint not writable; ignoring press");
            return;
        }
        match meta.kind {
            DatapointKind::Boolean => self.toggle_boolean(address, now),
            DatapointKind::Number | DatapointKind::Text => {
                if self.scratchpad.error_showing() {
                    debug!(address, "error token on buffer; ignoring press");
                    return;
                }
                let Some(entry) = self.scratchpad.entry_text().map(str::to_string) else {
                    return;
                };
                if entry.is_empty() {
                    return;
                }
                self.write_entry(address, &meta, &entry, rule.as_ref(), now);
            }
            DatapointKind::Unsupported => {
                debug!(address, "unsupported datapoint kind; ignoring press");
            }
        }
    }

    /// Toggle a boolean datapoint. The scratchpad is neither consulted nor
    /// disturbed.
    fn toggle_boolean(&mut self, address: &str, now: Instant) {
        let current = match self.remote.read(address) {
            Ok(read) => read,
            Err(err) => {
                warn!(address, %err, "boolean read failed");
                self.scratchpad
                    .flash_error(now, &mut self.display, tokens::WRITE_FAILED);
                return;
            }
        };
        let Value::Bool(state) = current.value else {
            warn!(address, "metadata says boolean but the value is not");
            return;
        };
        if let Err(err) = self.remote.write(address, Value::Bool(!state)) {
            warn!(address, %err, "boolean toggle failed");
            self.render_current_page();
            self.scratchpad
                .flash_error(now, &mut self.display, tokens::WRITE_FAILED);
            return;
        }
        self.render_current_page();
    }

    /// Validate the scratchpad entry against metadata (and the field rule,
    /// when the template carries one), then write.
    fn write_entry(
        &mut self,
        address: &str,
        meta: &DatapointMetadata,
        entry: &str,
        rule: Option<&ValidationRule>,
        now: Instant,
    ) {
        let value = match meta.kind {
            DatapointKind::Number => {
                let Some(number) = parse_strict_number(entry) else {
                    self.scratchpad
                        .show_error(tokens::FORMAT_ERROR, &mut self.display);
                    return;
                };
                if meta.min.is_some_and(|min| number < min)
                    || meta.max.is_some_and(|max| number > max)
                {
                    self.scratchpad
                        .show_error(tokens::OUT_OF_RANGE, &mut self.display);
                    return;
                }
                Value::Number(number)
            }
            // Text writes go through raw; only an authored rule constrains
            // them.
            _ => Value::Text(entry.to_string()),
        };
        if let Some(rule) = rule {
            let verdict = self.validation.validate(entry, rule, &self.remote);
            if let Verdict::Fail(token) = verdict {
                self.scratchpad.show_error(&token, &mut self.display);
                return;
            }
        }
        match self.remote.write(address, value) {
            Ok(()) => {
                self.scratchpad.force_clear();
                self.mode = InputMode::Normal;
                self.render_current_page();
                self.scratchpad
                    .flash_notice(now, &mut self.display, tokens::ENTRY_ACCEPTED);
            }
            Err(err) => {
                warn!(address, %err, "remote write failed");
                // The typed entry stays one CLR away.
                self.scratchpad
                    .show_error(tokens::WRITE_FAILED, &mut self.display);
            }
        }
    }

    // ------------------------------------------------------------------
    // Page control
    // ------------------------------------------------------------------

    pub fn switch_to_page(&mut self, id: &PageId) {
        if self.pages.page(id).is_none() {
            warn!(page = %id, "cannot switch to unknown page");
            return;
        }
        self.active_page = id.clone();
        self.render_current_page();
    }

    /// Compose and publish the active page, scratchpad line included.
    pub fn render_current_page(&mut self) {
        let Some(page) = self.pages.page(&self.active_page) else {
            warn!(page = %self.active_page, "active page has no configuration");
            return;
        };
        let mut frame = compose_page(page, &self.remote);
        let (text, color) = self.scratchpad.display_form();
        frame.set(SCRATCHPAD_ROW, &text, color);
        self.display.publish_full(&frame);
    }

    // ------------------------------------------------------------------
    // Dialog surface
    // ------------------------------------------------------------------

    pub fn show_soft_confirmation(
        &mut self,
        title: impl Into<String>,
        details: Vec<String>,
        action: Option<Box<dyn DialogAction>>,
    ) {
        self.dialog.show_soft(title, details, action, &mut self.display);
    }

    pub fn show_hard_confirmation(
        &mut self,
        title: impl Into<String>,
        warning: impl Into<String>,
        details: Vec<String>,
        action: Option<Box<dyn DialogAction>>,
    ) {
        self.dialog
            .show_hard(title, warning, details, action, &mut self.display);
    }

    pub fn show_countdown_confirmation(
        &mut self,
        title: impl Into<String>,
        details: Vec<String>,
        seconds: u32,
        action: Option<Box<dyn DialogAction>>,
        now: Instant,
    ) {
        self.dialog
            .show_countdown(title, details, seconds, action, now, &mut self.display);
    }

    /// Dismiss any active dialog without invoking its callbacks.
    pub fn clear_dialog(&mut self) {
        if self.dialog.clear() {
            self.render_current_page();
        }
    }

    // ------------------------------------------------------------------
    // External reset hooks
    // ------------------------------------------------------------------

    /// External reset: empty the buffer and drop back to NORMAL.
    pub fn reset_input(&mut self) {
        self.scratchpad.force_clear();
        self.mode = InputMode::Normal;
        self.scratchpad.render_now(&mut self.display);
    }

    /// Idle-timeout hook. There is no timeout transition; retained so the
    /// transport can call it without version skew.
    pub fn note_mode_timeout(&mut self, _now: Instant) {}
}
