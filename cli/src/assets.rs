//! Built-in demo assets.

use anyhow::{Context, Result};

use cdu_engine::StaticPages;
use cdu_types::PageTemplates;

const PAGES_RAW: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/pages.toml"));

/// The built-in demo page set.
pub fn demo_pages() -> Result<StaticPages> {
    let templates: PageTemplates =
        toml::from_str(PAGES_RAW).context("failed to parse built-in page templates")?;
    StaticPages::from_templates(templates).context("built-in page templates are inconsistent")
}
