//! Shared fixtures for the integration suite.

use cdu_engine::{Console, FrameBuffer, MemoryStore, StaticPages};
use cdu_types::{DatapointKind, DatapointMetadata, PageTemplates, Value};

/// A small template set in the authored TOML form, defective button
/// included.
pub const DEMO_TEMPLATES: &str = r#"
root = "main"

[[page]]
id = "main"
title = "MAIN MENU"

[[page.lines]]
[page.lines.left.display]
label = "CABIN TEMP"
source = "env.temp"

[page.lines.left.display.rule]
input_type = "numeric"
min = 16.0
max = 30.0

[page.lines.right.display]
label = "PUMP"
source = "dev.pump"

[[page.lines]]
[page.lines.left.button]
kind = "navigation"
target = "env"
label = "<ENVIRONMENT"

[page.lines.right.button]
kind = "navigation"
label = "BROKEN>"

[[page]]
id = "env"
title = "ENVIRONMENT"
parent = "main"

[[page.lines]]
[page.lines.left.display]
label = "CABIN TEMP"
source = "env.temp"
"#;

pub fn templates() -> PageTemplates {
    toml::from_str(DEMO_TEMPLATES).expect("fixture templates parse")
}

pub fn pages() -> StaticPages {
    StaticPages::from_templates(templates()).expect("fixture templates are consistent")
}

pub fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(
        "env.temp",
        Value::Number(21.0),
        DatapointMetadata::writable(DatapointKind::Number)
            .with_range(16.0, 30.0)
            .with_unit("C"),
    );
    store.insert(
        "dev.pump",
        Value::Bool(false),
        DatapointMetadata::writable(DatapointKind::Boolean),
    );
    store
}

pub fn console() -> (Console<MemoryStore, StaticPages, FrameBuffer>, FrameBuffer) {
    let display = FrameBuffer::new();
    let console = Console::new(store(), pages(), display.clone());
    (console, display)
}
