//! End-to-end console flows over TOML-loaded templates.

use std::time::{Duration, Instant};

use cdu_engine::InputMode;
use cdu_types::{Event, PageId, Side, Value, tokens};

use crate::common;

#[test]
fn entry_write_round_trip_from_authored_templates() {
    let (mut console, _display) = common::console();
    let now = Instant::now();
    for c in "22.5".chars() {
        console.handle_event(Event::Key(c), now);
    }
    console.handle_event(Event::Lsk(Side::Left, 1), now);
    assert_eq!(
        console.remote().current("env.temp"),
        Some(&Value::Number(22.5))
    );
    assert_eq!(console.mode(), InputMode::Normal);
    assert_eq!(console.scratchpad().content(), "");
}

#[test]
fn out_of_range_entry_is_recoverable_with_one_clr() {
    let (mut console, _display) = common::console();
    let now = Instant::now();
    for c in "99".chars() {
        console.handle_event(Event::Key(c), now);
    }
    console.handle_event(Event::Lsk(Side::Left, 1), now);
    assert_eq!(
        console.remote().current("env.temp"),
        Some(&Value::Number(21.0))
    );
    assert_eq!(console.scratchpad().content(), tokens::OUT_OF_RANGE);
    console.handle_event(Event::Clr, now);
    assert_eq!(console.scratchpad().content(), "99");
}

#[test]
fn boolean_toggle_ignores_scratchpad_content() {
    let (mut console, _display) = common::console();
    let now = Instant::now();
    console.handle_event(Event::Key('5'), now);
    console.handle_event(Event::Lsk(Side::Right, 1), now);
    assert_eq!(
        console.remote().current("dev.pump"),
        Some(&Value::Bool(true))
    );
    assert_eq!(console.scratchpad().content(), "5");
}

#[test]
fn navigation_and_parent_return() {
    let (mut console, _display) = common::console();
    let mut now = Instant::now();
    console.handle_event(Event::Lsk(Side::Left, 2), now);
    assert_eq!(console.active_page(), &PageId::new("env"));
    now += Duration::from_secs(5);
    console.handle_event(Event::Clr, now);
    assert_eq!(console.active_page(), &PageId::new("main"));
}

#[test]
fn double_clr_returns_to_root_from_anywhere() {
    let (mut console, display) = common::console();
    let mut now = Instant::now();
    console.handle_event(Event::Lsk(Side::Left, 2), now);
    for c in "123".chars() {
        console.handle_event(Event::Key(c), now);
    }
    console.handle_event(Event::Clr, now);
    now += Duration::from_millis(300);
    console.handle_event(Event::Clr, now);
    assert_eq!(console.active_page(), &PageId::new("main"));
    assert_eq!(console.mode(), InputMode::Normal);
    assert_eq!(console.scratchpad().content(), "");
    assert_eq!(display.text(cdu_types::ANNUNCIATOR_ROW), tokens::RETURNING_HOME);
}

#[test]
fn defective_button_press_changes_nothing() {
    let (mut console, _display) = common::console();
    console.handle_event(Event::Lsk(Side::Right, 2), Instant::now());
    assert_eq!(console.active_page(), &PageId::new("main"));
}
