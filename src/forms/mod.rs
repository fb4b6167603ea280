//! Account forms: field constraints, cross-field checks and render metadata.
//!
//! Each form is a plain request DTO implementing [`Form`]. Validation runs in
//! two passes through [`validate`]:
//!
//! 1. Every field in the form's [`FieldSpec`] table is checked by the shared
//!    rule engine in [`rules`]. All failing fields are collected.
//! 2. Only if no field failed, the form's [`Form::check`] hook runs the
//!    cross-field and storage-backed checks (password confirmation,
//!    uniqueness, old password).
//!
//! Collected failures surface as [`AppError::InvalidForm`]; storage errors
//! raised by a hook propagate unchanged.
//!
//! # Forms
//!
//! - [`auth`] - [`RegisterForm`], [`LoginForm`], [`ForgotForm`], [`ResetPwdForm`]
//! - [`settings`] - [`ProfileForm`], [`PasswordForm`]
//! - [`admin`] - [`UserAdminForm`]

pub mod admin;
pub mod auth;
pub mod rules;
pub mod settings;

pub use admin::UserAdminForm;
pub use auth::{ForgotForm, LoginForm, RegisterForm, ResetPwdForm};
pub use rules::{FieldSpec, FieldValue, InputKind, Rule};
pub use settings::{PasswordForm, ProfileForm, SelectOption};

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::i18n::{MessageArg, Translator};
use rules::{check_field, field_error};

/// Presentation text for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldText {
    /// Message id resolved through the translator at render time.
    Key(&'static str),
    /// Text already rendered for the request's language.
    Text(String),
}

impl FieldText {
    pub fn render(&self, tr: &dyn Translator) -> String {
        match self {
            FieldText::Key(key) => tr.tr(key, &[]),
            FieldText::Text(text) => text.clone(),
        }
    }
}

/// Field name to presentation text.
pub type FieldTexts = BTreeMap<&'static str, FieldText>;

/// Builds a [`FieldTexts`] map of message ids.
pub(crate) fn keys<const N: usize>(entries: [(&'static str, &'static str); N]) -> FieldTexts {
    entries
        .into_iter()
        .map(|(field, key)| (field, FieldText::Key(key)))
        .collect()
}

/// A per-request input DTO with validation rules and render metadata.
#[async_trait]
pub trait Form: Send {
    /// Constraint manifest, one entry per rendered field.
    fn fields(&self) -> &'static [FieldSpec];

    /// Current value of a manifest field; `None` for names the form does not have.
    fn value(&self, field: &str) -> Option<FieldValue<'_>>;

    fn labels(&self) -> FieldTexts {
        FieldTexts::new()
    }

    fn helps(&self, _tr: &dyn Translator) -> FieldTexts {
        FieldTexts::new()
    }

    fn placeholders(&self) -> FieldTexts {
        FieldTexts::new()
    }

    /// Cross-field hook, run only after every field passed its rules.
    ///
    /// Failures are added to `errors`; an `Err` is reserved for storage errors.
    async fn check(
        &mut self,
        _users: &dyn UserRepository,
        _errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

/// Runs the rule engine over every field of `form`.
pub fn check_fields<F: Form + ?Sized>(form: &F) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for spec in form.fields() {
        let Some(value) = form.value(spec.name) else {
            continue;
        };
        if let Some(err) = check_field(spec, value) {
            errors.add(spec.name, err);
        }
    }
    errors
}

/// Validates `form`: field rules first, then the cross-field hook.
///
/// # Errors
///
/// Returns [`AppError::InvalidForm`] with every collected field error.
/// Storage errors from the hook propagate unchanged.
pub async fn validate<F: Form + ?Sized>(
    form: &mut F,
    users: &dyn UserRepository,
) -> Result<(), AppError> {
    let mut errors = check_fields(form);

    if errors.is_empty() {
        form.check(users, &mut errors).await?;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        tracing::debug!(?fields, "Form rejected");
        Err(AppError::InvalidForm(errors))
    }
}

/// Adds a confirmation error unless both passwords are byte-equal.
///
/// Returns whether they matched so hooks can stop early.
pub(crate) fn passwords_match(
    password: &str,
    password_re: &str,
    errors: &mut ValidationErrors,
) -> bool {
    if password == password_re {
        return true;
    }
    errors.add(
        "password_re",
        field_error("repassword_not_match", "auth.repassword_not_match"),
    );
    false
}

/// Rendered description of one field for the template layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub input: InputKind,
    pub required: bool,
    pub rules: &'static [Rule],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Joins the constraint manifest with translated label, help and placeholder text.
pub fn manifest<F: Form + ?Sized>(form: &F, tr: &dyn Translator) -> Vec<FieldMeta> {
    let labels = form.labels();
    let helps = form.helps(tr);
    let placeholders = form.placeholders();

    form.fields()
        .iter()
        .map(|spec| FieldMeta {
            name: spec.name,
            input: spec.input,
            required: spec.is_required(),
            rules: spec.rules,
            label: labels.get(spec.name).map(|t| t.render(tr)),
            help: helps.get(spec.name).map(|t| t.render(tr)),
            placeholder: placeholders.get(spec.name).map(|t| t.render(tr)),
        })
        .collect()
}

/// Renders a collected field error through the translator.
pub fn error_text(err: &ValidationError, tr: &dyn Translator) -> String {
    let key = err.message.as_deref().unwrap_or(&err.code);
    let args: Vec<MessageArg> = match err.params.get("arg") {
        Some(Value::Number(n)) => n.as_i64().map(MessageArg::Int).into_iter().collect(),
        Some(Value::String(s)) => vec![MessageArg::Text(s.clone())],
        _ => Vec::new(),
    };
    tr.tr(key, &args)
}

/// Translates every collected error, keyed by field name.
pub fn render_errors(errors: &ValidationErrors, tr: &dyn Translator) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            (
                field.to_string(),
                errs.iter().map(|e| error_text(e, tr)).collect(),
            )
        })
        .collect()
}

/// Message ids reported for `field`, in the order they were added.
pub fn messages_for(errors: &ValidationErrors, field: &str) -> Vec<String> {
    errors
        .field_errors()
        .get(field)
        .map(|errs| {
            errs.iter()
                .map(|e| e.message.as_deref().unwrap_or(&e.code).to_string())
                .collect()
        })
        .unwrap_or_default()
}
