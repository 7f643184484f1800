//! Page templates: the per-page line/field configuration the terminal runs on.
//!
//! Templates are authored as TOML and deserialized straight into these
//! structs. Validation of cross-references (root page, parent pointers)
//! happens once at load time; a malformed individual line never takes the
//! terminal down at runtime.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Side;
use crate::validation::ValidationRule;

/// Identifier of a page template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What a button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    /// Switch to the target page.
    Navigation,
    /// Run metadata-driven dispatch against the target datapoint.
    Datapoint,
}

/// A button field as authored.
///
/// Both `kind` and `target` are optional because the page editor is known to
/// persist a button kind without a target; [`ButtonConfig::actionable`] is
/// the single place that defect is filtered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub kind: Option<ButtonKind>,
    pub target: Option<String>,
    pub label: Option<String>,
}

/// A resolved, executable button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction<'a> {
    Navigate(&'a str),
    Datapoint(&'a str),
}

impl ButtonConfig {
    /// Resolve this button to an action, or `None` if it is not actionable.
    ///
    /// A button is actionable only if its kind is present and its target is
    /// non-empty.
    #[must_use]
    pub fn actionable(&self) -> Option<ButtonAction<'_>> {
        let target = self.target.as_deref().filter(|t| !t.trim().is_empty())?;
        match self.kind? {
            ButtonKind::Navigation => Some(ButtonAction::Navigate(target)),
            ButtonKind::Datapoint => Some(ButtonAction::Datapoint(target)),
        }
    }
}

/// A display field: a label, optionally backed by a remote datapoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub label: Option<String>,
    /// Datapoint address; presence makes this a datapoint field.
    pub source: Option<String>,
    /// Entry constraints applied when the operator writes to `source`.
    pub rule: Option<ValidationRule>,
}

/// One side of a display line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub button: Option<ButtonConfig>,
    pub display: Option<DisplayConfig>,
}

/// One of the six selectable lines of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub left: FieldConfig,
    pub right: FieldConfig,
}

impl LineConfig {
    #[must_use]
    pub fn side(&self, side: Side) -> &FieldConfig {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// A full page template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub id: PageId,
    pub title: String,
    #[serde(default)]
    pub parent: Option<PageId>,
    #[serde(default)]
    pub lines: Vec<LineConfig>,
}

impl PageConfig {
    /// Line config for a 1-based LSK index.
    #[must_use]
    pub fn line(&self, index: u8) -> Option<&LineConfig> {
        let index = usize::from(index.checked_sub(1)?);
        self.lines.get(index)
    }
}

/// Error found while cross-checking a loaded template set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("root page {0} is not defined")]
    MissingRoot(PageId),
    #[error("page {page} names unknown parent {parent}")]
    UnknownParent { page: PageId, parent: PageId },
    #[error("page {0} is defined twice")]
    DuplicatePage(PageId),
}

/// A validated set of page templates, as loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PageTemplates {
    pub root: PageId,
    #[serde(rename = "page")]
    pub pages: Vec<PageConfig>,
}

impl PageTemplates {
    /// Cross-check the set and index it by page id.
    pub fn into_index(self) -> Result<(PageId, HashMap<PageId, PageConfig>), TemplateError> {
        let mut index = HashMap::with_capacity(self.pages.len());
        for page in self.pages {
            let id = page.id.clone();
            if index.insert(id.clone(), page).is_some() {
                return Err(TemplateError::DuplicatePage(id));
            }
        }
        if !index.contains_key(&self.root) {
            return Err(TemplateError::MissingRoot(self.root));
        }
        for page in index.values() {
            if let Some(parent) = &page.parent
                && !index.contains_key(parent)
            {
                return Err(TemplateError::UnknownParent {
                    page: page.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
        Ok((self.root, index))
    }
}
