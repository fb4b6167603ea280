//! Field constraint descriptors and the shared rule engine.
//!
//! Every form declares a static table of [`FieldSpec`]s. The table doubles as
//! the manifest handed to the rendering layer and as the input to
//! [`check_field`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use validator::{ValidateEmail, ValidationError};

/// ASCII letters, digits, underscore and dash.
static ALPHA_DASH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]+$").unwrap());

/// A single field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "arg", rename_all = "snake_case")]
pub enum Rule {
    Required,
    MinSize(usize),
    MaxSize(usize),
    Email,
    AlphaDash,
}

/// How the rendering layer should present a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Password,
    Textarea,
    Select,
    Checkbox,
    Number,
}

/// Constraint manifest entry for one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub input: InputKind,
    pub rules: &'static [Rule],
}

impl FieldSpec {
    pub const fn new(name: &'static str, input: InputKind, rules: &'static [Rule]) -> Self {
        Self { name, input, rules }
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

/// A field value as seen by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Bool(bool),
}

impl FieldValue<'_> {
    /// Fails `Required`. Integers are select indices, so any `n >= 0` is a choice.
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Int(n) => *n < 0,
            FieldValue::Bool(_) => false,
        }
    }

    /// Nothing was submitted. Whitespace counts as input.
    fn is_absent(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            other => other.is_blank(),
        }
    }
}

/// Builds a field error with a localization message id.
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn sized_error(code: &'static str, message: &'static str, limit: usize) -> ValidationError {
    let mut err = field_error(code, message);
    err.add_param(Cow::Borrowed("arg"), &limit);
    err
}

/// Evaluates one rule, returning the failure if the value violates it.
pub fn check_rule(rule: Rule, value: FieldValue<'_>) -> Option<ValidationError> {
    let ok = match (rule, value) {
        (Rule::Required, v) => !v.is_blank(),
        (Rule::MinSize(min), FieldValue::Text(s)) => s.chars().count() >= min,
        (Rule::MaxSize(max), FieldValue::Text(s)) => s.chars().count() <= max,
        (Rule::Email, FieldValue::Text(s)) => s.validate_email(),
        (Rule::AlphaDash, FieldValue::Text(s)) => ALPHA_DASH_REGEX.is_match(s),
        // Size and format rules only constrain text.
        (_, FieldValue::Int(_) | FieldValue::Bool(_)) => true,
    };

    if ok {
        return None;
    }

    Some(match rule {
        Rule::Required => field_error("required", "valid.required"),
        Rule::MinSize(min) => sized_error("min_size", "valid.min_size", min),
        Rule::MaxSize(max) => sized_error("max_size", "valid.max_size", max),
        Rule::Email => field_error("email", "valid.email"),
        Rule::AlphaDash => field_error("alpha_dash", "valid.alpha_dash"),
    })
}

/// Evaluates a field's rules in order and stops at the first failure.
///
/// An empty value of an optional field skips the remaining rules.
pub fn check_field(spec: &FieldSpec, value: FieldValue<'_>) -> Option<ValidationError> {
    if !spec.is_required() && value.is_absent() {
        return None;
    }

    spec.rules.iter().find_map(|rule| check_rule(*rule, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_NAME: FieldSpec = FieldSpec::new(
        "user_name",
        InputKind::Text,
        &[
            Rule::Required,
            Rule::AlphaDash,
            Rule::MinSize(5),
            Rule::MaxSize(30),
        ],
    );

    const URL: FieldSpec = FieldSpec::new("url", InputKind::Text, &[Rule::MaxSize(10)]);

    fn code(err: Option<ValidationError>) -> Option<String> {
        err.map(|e| e.code.to_string())
    }

    #[test]
    fn test_required_text() {
        assert_eq!(
            code(check_rule(Rule::Required, FieldValue::Text("   "))),
            Some("required".to_string())
        );
        assert!(check_rule(Rule::Required, FieldValue::Text("x")).is_none());
    }

    #[test]
    fn test_required_int_and_bool() {
        assert!(check_rule(Rule::Required, FieldValue::Int(0)).is_none());
        assert!(check_rule(Rule::Required, FieldValue::Int(-1)).is_some());
        assert!(check_rule(Rule::Required, FieldValue::Bool(false)).is_none());
    }

    #[test]
    fn test_sizes_count_chars() {
        assert!(check_rule(Rule::MaxSize(2), FieldValue::Text("éé")).is_none());
        assert!(check_rule(Rule::MinSize(3), FieldValue::Text("éé")).is_some());
    }

    #[test]
    fn test_size_error_carries_limit() {
        let err = check_rule(Rule::MinSize(5), FieldValue::Text("abc")).unwrap();

        assert_eq!(err.code, "min_size");
        assert_eq!(err.message.as_deref(), Some("valid.min_size"));
        assert_eq!(err.params["arg"], 5);
    }

    #[test]
    fn test_email() {
        assert!(check_rule(Rule::Email, FieldValue::Text("a@example.com")).is_none());
        assert!(check_rule(Rule::Email, FieldValue::Text("not-an-email")).is_some());
    }

    #[test]
    fn test_alpha_dash() {
        assert!(check_rule(Rule::AlphaDash, FieldValue::Text("user_name-01")).is_none());
        assert!(check_rule(Rule::AlphaDash, FieldValue::Text("user name")).is_some());
        assert!(check_rule(Rule::AlphaDash, FieldValue::Text("usér")).is_some());
    }

    #[test]
    fn test_check_field_stops_at_first_failure() {
        // Fails AlphaDash before MinSize is considered.
        let err = check_field(&USER_NAME, FieldValue::Text("a b"));
        assert_eq!(code(err), Some("alpha_dash".to_string()));

        let err = check_field(&USER_NAME, FieldValue::Text("abc"));
        assert_eq!(code(err), Some("min_size".to_string()));

        assert!(check_field(&USER_NAME, FieldValue::Text("alice")).is_none());
    }

    #[test]
    fn test_optional_empty_field_skips_rules() {
        assert!(check_field(&URL, FieldValue::Text("")).is_none());
        assert_eq!(
            code(check_field(&URL, FieldValue::Text("https://example.com"))),
            Some("max_size".to_string())
        );
    }

    #[test]
    fn test_optional_whitespace_still_sized() {
        let padded = " ".repeat(11);
        assert_eq!(
            code(check_field(&URL, FieldValue::Text(&padded))),
            Some("max_size".to_string())
        );
        assert!(check_field(&URL, FieldValue::Text("   ")).is_none());
    }

    #[test]
    fn test_rule_serializes_for_manifest() {
        let json = serde_json::to_value(USER_NAME).unwrap();

        assert_eq!(json["name"], "user_name");
        assert_eq!(json["input"], "text");
        assert_eq!(json["rules"][0]["rule"], "required");
        assert_eq!(json["rules"][2]["rule"], "min_size");
        assert_eq!(json["rules"][2]["arg"], 5);
    }
}
