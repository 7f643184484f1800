//! Remote values and the metadata that drives line-select dispatch.

use serde::{Deserialize, Serialize};

use crate::text::format_number;

/// A value held by (or written to) a remote datapoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Render the value the way the terminal shows it.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Value::Bool(true) => "ON".to_string(),
            Value::Bool(false) => "OFF".to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(t) => t.clone(),
        }
    }
}

/// Quality flag carried alongside every remote read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Good,
    Bad,
}

/// A remote read result: the value plus its quality flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteValue {
    pub value: Value,
    pub quality: Quality,
}

impl RemoteValue {
    #[must_use]
    pub fn good(value: Value) -> Self {
        Self {
            value,
            quality: Quality::Good,
        }
    }
}

/// Declared type of a datapoint.
///
/// A closed set matched exhaustively at the single dispatch site; anything
/// the metadata cache cannot classify arrives as `Unsupported` and degrades
/// to a no-op there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatapointKind {
    Boolean,
    Number,
    Text,
    Unsupported,
}

/// Cached per-address metadata from the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatapointMetadata {
    pub writable: bool,
    pub kind: DatapointKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Enumerated states for select-style datapoints.
    #[serde(default)]
    pub states: Vec<String>,
}

impl DatapointMetadata {
    /// Writable metadata with no range constraints.
    #[must_use]
    pub fn writable(kind: DatapointKind) -> Self {
        Self {
            writable: true,
            kind,
            min: None,
            max: None,
            unit: None,
            states: Vec::new(),
        }
    }

    /// Read-only metadata.
    #[must_use]
    pub fn read_only(kind: DatapointKind) -> Self {
        Self {
            writable: false,
            ..Self::writable(kind)
        }
    }

    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DatapointKind, DatapointMetadata, Value};

    #[test]
    fn bool_displays_as_on_off() {
        assert_eq!(Value::Bool(true).display(), "ON");
        assert_eq!(Value::Bool(false).display(), "OFF");
    }

    #[test]
    fn number_display_trims_trailing_zeros() {
        assert_eq!(Value::Number(30.0).display(), "30");
        assert_eq!(Value::Number(22.5).display(), "22.5");
    }

    #[test]
    fn metadata_builder_sets_range() {
        let meta = DatapointMetadata::writable(DatapointKind::Number).with_range(16.0, 30.0);
        assert_eq!(meta.min, Some(16.0));
        assert_eq!(meta.max, Some(30.0));
        assert!(meta.writable);
    }
}
