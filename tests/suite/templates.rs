//! Template loading: TOML round-trip, cross-checks, authoring-defect filter.

use cdu_engine::PageStore;
use cdu_types::{ButtonAction, ButtonConfig, InputType, PageId, PageTemplates, Side, TemplateError};

use crate::common;

#[test]
fn demo_templates_parse_and_index() {
    let pages = common::pages();
    assert_eq!(pages.root(), &PageId::new("main"));
    let main = pages.page(&PageId::new("main")).expect("main exists");
    assert_eq!(main.title, "MAIN MENU");
    assert_eq!(main.lines.len(), 2);
    let env = pages.page(&PageId::new("env")).expect("env exists");
    assert_eq!(env.parent, Some(PageId::new("main")));
}

#[test]
fn field_rules_deserialize_with_types_and_ranges() {
    let templates = common::templates();
    let main = &templates.pages[0];
    let rule = main.lines[0]
        .left
        .display
        .as_ref()
        .and_then(|display| display.rule.as_ref())
        .expect("temp field has a rule");
    assert_eq!(rule.input_type, InputType::Numeric);
    assert_eq!(rule.min, Some(16.0));
    assert_eq!(rule.max, Some(30.0));
}

#[test]
fn authored_defect_button_is_filtered() {
    let templates = common::templates();
    let line = &templates.pages[0].lines[1];
    // Complete button resolves.
    assert_eq!(
        line.side(Side::Left)
            .button
            .as_ref()
            .and_then(ButtonConfig::actionable),
        Some(ButtonAction::Navigate("env"))
    );
    // Kind without target does not.
    assert_eq!(
        line.side(Side::Right)
            .button
            .as_ref()
            .and_then(ButtonConfig::actionable),
        None
    );
}

#[test]
fn unknown_parent_is_rejected_at_load() {
    let raw = r#"
root = "main"

[[page]]
id = "main"
title = "MAIN"
parent = "gone"
"#;
    let templates: PageTemplates = toml::from_str(raw).expect("parses");
    assert!(matches!(
        templates.into_index().unwrap_err(),
        TemplateError::UnknownParent { .. }
    ));
}

#[test]
fn duplicate_page_is_rejected_at_load() {
    let raw = r#"
root = "main"

[[page]]
id = "main"
title = "MAIN"

[[page]]
id = "main"
title = "MAIN AGAIN"
"#;
    let templates: PageTemplates = toml::from_str(raw).expect("parses");
    assert_eq!(
        templates.into_index().unwrap_err(),
        TemplateError::DuplicatePage(PageId::new("main"))
    );
}
