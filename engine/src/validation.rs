//! Three-tier validation: format, constraints, then custom business rules.
//!
//! Tiers short-circuit. Custom rules are looked up by the name a field's
//! rule carries; a name with no registered rule is a soft pass (a missing
//! rule must never block entry), while a rule that errors fails closed —
//! the one deliberate asymmetry against the fail-open default.

use std::collections::HashMap;

use tracing::{debug, warn};

use cdu_types::{InputType, ValidationRule, Value, Verdict, format_number, tokens};

use crate::ports::ValueAccessor;

/// A format-checked entry handed to constraint checks and custom rules.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Number(f64),
    Text(String),
}

impl TypedValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            TypedValue::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Number(_) => None,
            TypedValue::Text(t) => Some(t),
        }
    }
}

/// A named business rule consulted after format and constraint checks.
///
/// Rules receive the accessor so they can compare against other remote
/// values. Returning an error is treated as a validator fault and fails
/// closed.
pub trait CustomRule {
    fn check(
        &self,
        rule: &ValidationRule,
        value: &TypedValue,
        accessor: &dyn ValueAccessor,
    ) -> anyhow::Result<Verdict>;
}

/// The stateless validation pipeline plus the custom-rule registry.
#[derive(Default)]
pub struct ValidationEngine {
    custom: HashMap<String, Box<dyn CustomRule>>,
}

impl ValidationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, rule: Box<dyn CustomRule>) {
        self.custom.insert(name.into(), rule);
    }

    /// Run the full pipeline over a raw entry.
    pub fn validate(
        &self,
        raw: &str,
        rule: &ValidationRule,
        accessor: &dyn ValueAccessor,
    ) -> Verdict {
        if raw.is_empty() {
            return if rule.required {
                Verdict::fail(tokens::ENTRY_REQUIRED)
            } else {
                Verdict::Pass
            };
        }

        // Tier 1: format.
        let typed = match rule.input_type {
            InputType::Numeric => match parse_strict_number(raw) {
                Some(value) => TypedValue::Number(value),
                None => return Verdict::fail(tokens::FORMAT_ERROR),
            },
            InputType::Time => {
                if !check_time(raw) {
                    return Verdict::fail(tokens::INVALID_TIME);
                }
                TypedValue::Text(raw.to_string())
            }
            InputType::Date => {
                if !check_date(raw) {
                    return Verdict::fail(tokens::INVALID_DATE);
                }
                TypedValue::Text(raw.to_string())
            }
            InputType::Text | InputType::Select => {
                if !check_text(raw) {
                    return Verdict::fail(tokens::FORMAT_ERROR);
                }
                TypedValue::Text(raw.to_string())
            }
        };

        // Tier 2: range/constraints.
        let verdict = match &typed {
            TypedValue::Number(value) => number_constraints(*value, rule),
            TypedValue::Text(text) => text_constraints(text, rule),
        };
        if !verdict.is_valid() {
            return verdict;
        }

        // Tier 3: custom rule, only when the field names one.
        let Some(name) = rule.custom.as_deref() else {
            return Verdict::Pass;
        };
        let Some(custom) = self.custom.get(name) else {
            debug!(name, "no validator registered under this name; passing");
            return Verdict::Pass;
        };
        match custom.check(rule, &typed, accessor) {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(name, %err, "custom validator failed; rejecting entry");
                Verdict::fail(tokens::VALIDATION_FAILED)
            }
        }
    }
}

// ============================================================================
// Format checks
// ============================================================================

/// Strict decimal grammar: optional minus, digits, at most one decimal point
/// with digits on both sides, no exponent, no ambiguous leading zeros.
pub(crate) fn parse_strict_number(s: &str) -> Option<f64> {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return None;
    }
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // "007" and "01" are ambiguous; "0" and "0.5" are not.
    if int_part.len() > 1 && int_part.starts_with('0') {
        return None;
    }
    if let Some(frac_part) = frac_part
        && (frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Strict zero-padded HH:MM, 00-23 / 00-59.
pub(crate) fn check_time(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let (hours, minutes) = (&s[..2], &s[3..]);
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    hours.parse::<u8>().is_ok_and(|h| h <= 23) && minutes.parse::<u8>().is_ok_and(|m| m <= 59)
}

/// DD.MM.YYYY with calendar correctness (31.02 is not a date).
pub(crate) fn check_date(s: &str) -> bool {
    let mut parts = s.split('.');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if day.len() != 2 || month.len() != 2 || year.len() != 4 {
        return false;
    }
    let (Ok(day), Ok(month), Ok(year)) =
        (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>())
    else {
        return false;
    };
    chrono::NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// Free text may not carry raw control characters.
pub(crate) fn check_text(s: &str) -> bool {
    !s.chars().any(char::is_control)
}

// ============================================================================
// Constraint checks (shared with the scratchpad's quick check)
// ============================================================================

pub(crate) fn number_constraints(value: f64, rule: &ValidationRule) -> Verdict {
    if let Some(min) = rule.min
        && value < min
    {
        return Verdict::fail(format!("MINIMUM {}", format_number(min)));
    }
    if let Some(max) = rule.max
        && value > max
    {
        return Verdict::fail(format!("MAXIMUM {}", format_number(max)));
    }
    if let Some(step) = rule.step
        && step > 0.0
    {
        let tolerance = (step * 0.01).min(0.001);
        let base = rule.min.unwrap_or(0.0);
        let steps = ((value - base) / step).round();
        if (value - (base + steps * step)).abs() > tolerance {
            return Verdict::fail(tokens::INVALID_INCREMENT);
        }
    }
    Verdict::Pass
}

pub(crate) fn text_constraints(text: &str, rule: &ValidationRule) -> Verdict {
    let len = text.chars().count();
    if let Some(min_length) = rule.min_length
        && len < min_length
    {
        return Verdict::fail(format!("MINIMUM {min_length} CHARS"));
    }
    if let Some(max_length) = rule.max_length
        && len > max_length
    {
        return Verdict::fail(format!("MAXIMUM {max_length} CHARS"));
    }
    if let Some(pattern) = rule.pattern.as_deref() {
        match regex::Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(text) {
                    return Verdict::fail(tokens::FORMAT_ERROR);
                }
            }
            Err(err) => {
                // A broken authored pattern must not brick entry.
                warn!(pattern, %err, "ignoring unparseable field pattern");
            }
        }
    }
    if !rule.options.is_empty() && !rule.options.iter().any(|option| option == text) {
        return Verdict::fail(tokens::INVALID_SELECTION);
    }
    Verdict::Pass
}

// ============================================================================
// Built-in example rules
// ============================================================================
//
// All three consult other remote values and pass when their comparison data
// is unavailable: a transient lookup failure must not brick the terminal.

/// Cross-reference rule: the entry must not exceed another datapoint's
/// current value.
pub struct NotAboveReference {
    reference: String,
}

impl NotAboveReference {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

impl CustomRule for NotAboveReference {
    fn check(
        &self,
        _rule: &ValidationRule,
        value: &TypedValue,
        accessor: &dyn ValueAccessor,
    ) -> anyhow::Result<Verdict> {
        let Some(entered) = value.as_number() else {
            return Ok(Verdict::Pass);
        };
        match accessor.value(&self.reference) {
            Some(Value::Number(limit)) => Ok(if entered > limit {
                Verdict::fail(format!("MAXIMUM {}", format_number(limit)))
            } else {
                Verdict::Pass
            }),
            _ => Ok(Verdict::Pass),
        }
    }
}

/// Temporal rule: an HH:MM entry must be later than a reference clock
/// datapoint.
pub struct LaterThanReference {
    reference: String,
}

impl LaterThanReference {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

fn minutes_of_day(s: &str) -> Option<u32> {
    if !check_time(s) {
        return None;
    }
    let hours: u32 = s[..2].parse().ok()?;
    let minutes: u32 = s[3..].parse().ok()?;
    Some(hours * 60 + minutes)
}

impl CustomRule for LaterThanReference {
    fn check(
        &self,
        _rule: &ValidationRule,
        value: &TypedValue,
        accessor: &dyn ValueAccessor,
    ) -> anyhow::Result<Verdict> {
        let entered = value.as_text().and_then(minutes_of_day);
        let reference = match accessor.value(&self.reference) {
            Some(Value::Text(t)) => minutes_of_day(&t),
            _ => None,
        };
        match (entered, reference) {
            (Some(entered), Some(reference)) if entered <= reference => {
                Ok(Verdict::fail(tokens::TIME_TOO_EARLY))
            }
            _ => Ok(Verdict::Pass),
        }
    }
}

/// Guarded precondition rule: entry is accepted only while a boolean guard
/// datapoint reads true.
pub struct RequiresGuard {
    guard: String,
}

impl RequiresGuard {
    #[must_use]
    pub fn new(guard: impl Into<String>) -> Self {
        Self {
            guard: guard.into(),
        }
    }
}

impl CustomRule for RequiresGuard {
    fn check(
        &self,
        _rule: &ValidationRule,
        _value: &TypedValue,
        accessor: &dyn ValueAccessor,
    ) -> anyhow::Result<Verdict> {
        match accessor.value(&self.guard) {
            Some(Value::Bool(false)) => Ok(Verdict::fail(tokens::NOT_ARMED)),
            // Guard true, non-boolean, or unavailable: fail open.
            _ => Ok(Verdict::Pass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CustomRule, LaterThanReference, NotAboveReference, RequiresGuard, TypedValue,
        ValidationEngine, check_date, check_time, parse_strict_number,
    };
    use crate::ports::{MemoryStore, ValueAccessor};
    use anyhow::anyhow;
    use cdu_types::{
        DatapointKind, DatapointMetadata, InputType, ValidationRule, Value, Verdict, tokens,
    };

    struct NoValues;

    impl ValueAccessor for NoValues {
        fn value(&self, _address: &str) -> Option<Value> {
            None
        }
    }

    struct ExplodingRule;

    impl CustomRule for ExplodingRule {
        fn check(
            &self,
            _rule: &ValidationRule,
            _value: &TypedValue,
            _accessor: &dyn ValueAccessor,
        ) -> anyhow::Result<Verdict> {
            Err(anyhow!("rule blew up"))
        }
    }

    fn numeric_rule() -> ValidationRule {
        ValidationRule::numeric(Some(16.0), Some(30.0))
    }

    #[test]
    fn format_failure_short_circuits_range() {
        let engine = ValidationEngine::new();
        let verdict = engine.validate("abc", &numeric_rule(), &NoValues);
        assert_eq!(verdict.message(), Some(tokens::FORMAT_ERROR));
    }

    #[test]
    fn range_check_runs_after_format() {
        let engine = ValidationEngine::new();
        assert!(engine.validate("22.5", &numeric_rule(), &NoValues).is_valid());
        assert_eq!(
            engine.validate("35", &numeric_rule(), &NoValues).message(),
            Some("MAXIMUM 30")
        );
    }

    #[test]
    fn missing_validator_name_is_a_soft_pass() {
        let engine = ValidationEngine::new();
        let rule = ValidationRule {
            custom: Some("never-registered".to_string()),
            ..numeric_rule()
        };
        assert!(engine.validate("20", &rule, &NoValues).is_valid());
    }

    #[test]
    fn erring_validator_fails_closed() {
        let mut engine = ValidationEngine::new();
        engine.register("explodes", Box::new(ExplodingRule));
        let rule = ValidationRule {
            custom: Some("explodes".to_string()),
            ..numeric_rule()
        };
        assert_eq!(
            engine.validate("20", &rule, &NoValues).message(),
            Some(tokens::VALIDATION_FAILED)
        );
    }

    #[test]
    fn cross_reference_rule_compares_and_fails_open() {
        let mut store = MemoryStore::new();
        store.insert(
            "limits.max",
            Value::Number(25.0),
            DatapointMetadata::read_only(DatapointKind::Number),
        );
        let rule = NotAboveReference::new("limits.max");
        let over = rule
            .check(&numeric_rule(), &TypedValue::Number(26.0), &store)
            .expect("rule runs");
        assert!(!over.is_valid());
        let under = rule
            .check(&numeric_rule(), &TypedValue::Number(20.0), &store)
            .expect("rule runs");
        assert!(under.is_valid());
        // Reference gone: fail open.
        let open = rule
            .check(&numeric_rule(), &TypedValue::Number(99.0), &NoValues)
            .expect("rule runs");
        assert!(open.is_valid());
    }

    #[test]
    fn temporal_rule_requires_later_time() {
        let mut store = MemoryStore::new();
        store.insert(
            "sys.clock",
            Value::Text("12:00".to_string()),
            DatapointMetadata::read_only(DatapointKind::Text),
        );
        let rule = LaterThanReference::new("sys.clock");
        let early = rule
            .check(
                &ValidationRule::default(),
                &TypedValue::Text("11:59".to_string()),
                &store,
            )
            .expect("rule runs");
        assert_eq!(early.message(), Some(tokens::TIME_TOO_EARLY));
        let later = rule
            .check(
                &ValidationRule::default(),
                &TypedValue::Text("12:01".to_string()),
                &store,
            )
            .expect("rule runs");
        assert!(later.is_valid());
        let open = rule
            .check(
                &ValidationRule::default(),
                &TypedValue::Text("11:59".to_string()),
                &NoValues,
            )
            .expect("rule runs");
        assert!(open.is_valid());
    }

    #[test]
    fn guard_rule_blocks_only_on_explicit_false() {
        let mut store = MemoryStore::new();
        store.insert(
            "sys.armed",
            Value::Bool(false),
            DatapointMetadata::read_only(DatapointKind::Boolean),
        );
        let rule = RequiresGuard::new("sys.armed");
        let blocked = rule
            .check(
                &ValidationRule::default(),
                &TypedValue::Number(1.0),
                &store,
            )
            .expect("rule runs");
        assert_eq!(blocked.message(), Some(tokens::NOT_ARMED));
        store.insert(
            "sys.armed",
            Value::Bool(true),
            DatapointMetadata::read_only(DatapointKind::Boolean),
        );
        assert!(
            rule.check(
                &ValidationRule::default(),
                &TypedValue::Number(1.0),
                &store
            )
            .expect("rule runs")
            .is_valid()
        );
        // Guard unavailable: fail open.
        assert!(
            rule.check(
                &ValidationRule::default(),
                &TypedValue::Number(1.0),
                &NoValues
            )
            .expect("rule runs")
            .is_valid()
        );
    }

    #[test]
    fn strict_number_grammar() {
        assert_eq!(parse_strict_number("22.5"), Some(22.5));
        assert_eq!(parse_strict_number("-4"), Some(-4.0));
        assert_eq!(parse_strict_number("0.5"), Some(0.5));
        assert_eq!(parse_strict_number("0"), Some(0.0));
        for bad in ["", "-", "1.2.3", "1e5", "007", "01", ".", "5.", ".5", "+5", "--2"] {
            assert_eq!(parse_strict_number(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn strict_time_grammar() {
        assert!(check_time("00:00"));
        assert!(check_time("23:59"));
        for bad in ["24:00", "12:60", "9:30", "0900", "12:3", "ab:cd"] {
            assert!(!check_time(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn date_requires_calendar_correctness() {
        assert!(check_date("01.01.2026"));
        assert!(check_date("29.02.2024"));
        for bad in ["31.02.2026", "29.02.2023", "00.01.2026", "1.1.2026", "2026.01.01"] {
            assert!(!check_date(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn text_rejects_control_characters() {
        let engine = ValidationEngine::new();
        let rule = ValidationRule::default();
        assert!(engine.validate("CALLSIGN 7", &rule, &NoValues).is_valid());
        assert_eq!(
            engine.validate("BAD\u{7}", &rule, &NoValues).message(),
            Some(tokens::FORMAT_ERROR)
        );
    }

    #[test]
    fn select_requires_membership() {
        let engine = ValidationEngine::new();
        let rule = ValidationRule {
            input_type: InputType::Select,
            options: vec!["AUTO".to_string(), "OFF".to_string()],
            ..ValidationRule::default()
        };
        assert!(engine.validate("AUTO", &rule, &NoValues).is_valid());
        assert_eq!(
            engine.validate("MAYBE", &rule, &NoValues).message(),
            Some(tokens::INVALID_SELECTION)
        );
    }
}
