//! Dialog variants driven through the console dispatcher.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use cdu_engine::DialogAction;
use cdu_types::{Event, Side};

use crate::common;

#[derive(Clone, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl DialogAction for Recorder {
    fn confirm(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push("confirm");
        Ok(())
    }

    fn cancel(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push("cancel");
        Ok(())
    }
}

#[test]
fn soft_dialog_cancel_and_confirm_paths() {
    let (mut console, _display) = common::console();
    let now = Instant::now();

    let recorder = Recorder::default();
    console.show_soft_confirmation("STOP PUMP", vec![], Some(Box::new(recorder.clone())));
    console.handle_event(Event::Lsk(Side::Left, 6), now);
    assert_eq!(recorder.calls(), vec!["cancel"]);
    assert!(!console.dialog().is_active());

    let recorder = Recorder::default();
    console.show_soft_confirmation("STOP PUMP", vec![], Some(Box::new(recorder.clone())));
    console.handle_event(Event::Confirm, now);
    assert_eq!(recorder.calls(), vec!["confirm"]);
}

#[test]
fn hard_dialog_only_exec_confirms() {
    let (mut console, _display) = common::console();
    let now = Instant::now();
    let recorder = Recorder::default();
    console.show_hard_confirmation(
        "RESET CONTROLLER",
        "IRREVERSIBLE",
        vec!["ALL LINKS WILL DROP".to_string()],
        Some(Box::new(recorder.clone())),
    );
    console.handle_event(Event::Lsk(Side::Left, 6), now);
    assert!(console.dialog().is_active());
    assert!(recorder.calls().is_empty());
    console.handle_event(Event::Confirm, now);
    assert_eq!(recorder.calls(), vec!["confirm"]);
    assert!(!console.dialog().is_active());
}

#[test]
fn countdown_dialog_auto_confirms_and_page_returns() {
    let (mut console, display) = common::console();
    let mut now = Instant::now();
    let recorder = Recorder::default();
    console.show_countdown_confirmation(
        "REBOOT DEVICE",
        vec![],
        2,
        Some(Box::new(recorder.clone())),
        now,
    );
    assert!(display.text(0).contains("REBOOT DEVICE"));
    now += Duration::from_secs(1);
    console.tick(now);
    assert!(console.dialog().is_active());
    now += Duration::from_secs(1);
    console.tick(now);
    assert_eq!(recorder.calls(), vec!["confirm"]);
    assert!(!console.dialog().is_active());
    assert!(display.text(0).contains("MAIN MENU"));
}

#[test]
fn countdown_cancel_stops_the_timer() {
    let (mut console, _display) = common::console();
    let mut now = Instant::now();
    let recorder = Recorder::default();
    console.show_countdown_confirmation(
        "REBOOT DEVICE",
        vec![],
        5,
        Some(Box::new(recorder.clone())),
        now,
    );
    now += Duration::from_secs(1);
    console.tick(now);
    console.handle_event(Event::Lsk(Side::Left, 6), now);
    assert_eq!(recorder.calls(), vec!["cancel"]);
    now += Duration::from_secs(60);
    console.tick(now);
    assert_eq!(recorder.calls(), vec!["cancel"]);
}
