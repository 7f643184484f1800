//! Field validation rules and verdicts.

use serde::{Deserialize, Serialize};

/// Format class of a typed entry. Defaults to free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Numeric,
    Time,
    Date,
    #[default]
    Text,
    Select,
}

/// Declarative constraints attached to an editable field.
///
/// All fields are optional so templates only state what they care about.
/// `custom` names a validator registered with the validation engine; an
/// unregistered name is a soft pass, never a hard failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRule {
    pub input_type: InputType,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub options: Vec<String>,
    pub custom: Option<String>,
}

impl ValidationRule {
    #[must_use]
    pub fn numeric(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            input_type: InputType::Numeric,
            min,
            max,
            ..Self::default()
        }
    }
}

/// Outcome of a validation pass.
///
/// Failure messages are fixed-vocabulary tokens, never technical detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    #[must_use]
    pub fn fail(token: impl Into<String>) -> Self {
        Verdict::Fail(token.into())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(token) => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InputType, ValidationRule, Verdict};

    #[test]
    fn default_rule_is_unconstrained_text() {
        let rule = ValidationRule::default();
        assert_eq!(rule.input_type, InputType::Text);
        assert!(!rule.required);
        assert!(rule.options.is_empty());
    }

    #[test]
    fn verdict_accessors() {
        assert!(Verdict::Pass.is_valid());
        let fail = Verdict::fail("MAXIMUM 30");
        assert!(!fail.is_valid());
        assert_eq!(fail.message(), Some("MAXIMUM 30"));
    }
}
