//! Sign-up, sign-in and password recovery forms.

use async_trait::async_trait;
use serde::Deserialize;
use validator::ValidationErrors;

use super::rules::{FieldSpec, FieldValue, InputKind, Rule, field_error};
use super::{FieldText, FieldTexts, Form, keys, passwords_match};
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::i18n::Translator;

const USER_NAME_RULES: &[Rule] = &[
    Rule::Required,
    Rule::AlphaDash,
    Rule::MinSize(5),
    Rule::MaxSize(30),
];
const PASSWORD_RULES: &[Rule] = &[Rule::Required, Rule::MinSize(4), Rule::MaxSize(30)];
const EMAIL_RULES: &[Rule] = &[Rule::Required, Rule::Email, Rule::MaxSize(80)];

/// Account registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub password_re: String,
}

const REGISTER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user_name", InputKind::Text, USER_NAME_RULES),
    FieldSpec::new("email", InputKind::Text, EMAIL_RULES),
    FieldSpec::new("password", InputKind::Password, PASSWORD_RULES),
    FieldSpec::new("password_re", InputKind::Password, PASSWORD_RULES),
];

#[async_trait]
impl Form for RegisterForm {
    fn fields(&self) -> &'static [FieldSpec] {
        REGISTER_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "user_name" => FieldValue::Text(&self.user_name),
            "email" => FieldValue::Text(&self.email),
            "password" => FieldValue::Text(&self.password),
            "password_re" => FieldValue::Text(&self.password_re),
            _ => return None,
        })
    }

    fn labels(&self) -> FieldTexts {
        keys([
            ("user_name", "auth.login_username"),
            ("email", "auth.login_email"),
            ("password", "auth.login_password"),
            ("password_re", "auth.retype_password"),
        ])
    }

    fn helps(&self, tr: &dyn Translator) -> FieldTexts {
        let user_name = format!(
            "{}, {}",
            tr.tr("valid.min_length_is", &[5.into()]),
            tr.tr("valid.only_contains", &["a-z 0-9 - _".into()])
        );
        FieldTexts::from([("user_name", FieldText::Text(user_name))])
    }

    fn placeholders(&self) -> FieldTexts {
        keys([
            ("user_name", "auth.plz_enter_username"),
            ("email", "auth.plz_enter_email"),
            ("password", "auth.plz_enter_password"),
            ("password_re", "auth.plz_reenter_password"),
        ])
    }

    async fn check(
        &mut self,
        users: &dyn UserRepository,
        errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        if !passwords_match(&self.password, &self.password_re, errors) {
            return Ok(());
        }

        let availability = users.can_register(&self.user_name, &self.email).await?;

        if !availability.user_name_free {
            errors.add(
                "user_name",
                field_error("username_already_taken", "auth.username_already_taken"),
            );
        }
        if !availability.email_free {
            errors.add(
                "email",
                field_error("email_already_taken", "auth.email_already_taken"),
            );
        }

        Ok(())
    }
}

/// Sign-in with a user name or an email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub user_name: String,
    pub password: String,
    pub remember: bool,
}

const LOGIN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user_name", InputKind::Text, &[Rule::Required]),
    FieldSpec::new("password", InputKind::Password, &[Rule::Required]),
    FieldSpec::new("remember", InputKind::Checkbox, &[]),
];

#[async_trait]
impl Form for LoginForm {
    fn fields(&self) -> &'static [FieldSpec] {
        LOGIN_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "user_name" => FieldValue::Text(&self.user_name),
            "password" => FieldValue::Text(&self.password),
            "remember" => FieldValue::Bool(self.remember),
            _ => return None,
        })
    }

    fn labels(&self) -> FieldTexts {
        keys([
            ("user_name", "auth.username_or_email"),
            ("password", "auth.login_password"),
            ("remember", "auth.login_remember_me"),
        ])
    }
}

/// Forgotten-password request.
///
/// A successful check leaves the matched account in `user`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgotForm {
    pub email: String,
    #[serde(skip)]
    pub user: Option<User>,
}

const FORGOT_FIELDS: &[FieldSpec] = &[FieldSpec::new("email", InputKind::Text, EMAIL_RULES)];

#[async_trait]
impl Form for ForgotForm {
    fn fields(&self) -> &'static [FieldSpec] {
        FORGOT_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "email" => Some(FieldValue::Text(&self.email)),
            _ => None,
        }
    }

    fn labels(&self) -> FieldTexts {
        keys([("email", "auth.login_email")])
    }

    fn helps(&self, _tr: &dyn Translator) -> FieldTexts {
        keys([("email", "auth.forgotform_email_help")])
    }

    async fn check(
        &mut self,
        users: &dyn UserRepository,
        errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        self.user = users.find_by_login(&self.email).await?;

        if self.user.is_none() {
            errors.add(
                "email",
                field_error("forgotform_wrong_email", "auth.forgotform_wrong_email"),
            );
        }

        Ok(())
    }
}

/// New password entered from a reset link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetPwdForm {
    pub password: String,
    pub password_re: String,
}

const RESET_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("password", InputKind::Password, PASSWORD_RULES),
    FieldSpec::new("password_re", InputKind::Password, PASSWORD_RULES),
];

#[async_trait]
impl Form for ResetPwdForm {
    fn fields(&self) -> &'static [FieldSpec] {
        RESET_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "password" => FieldValue::Text(&self.password),
            "password_re" => FieldValue::Text(&self.password_re),
            _ => return None,
        })
    }

    fn labels(&self) -> FieldTexts {
        keys([("password_re", "auth.retype_password")])
    }

    fn placeholders(&self) -> FieldTexts {
        keys([
            ("password", "auth.plz_enter_password"),
            ("password_re", "auth.plz_reenter_password"),
        ])
    }

    async fn check(
        &mut self,
        _users: &dyn UserRepository,
        errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        passwords_match(&self.password, &self.password_re, errors);
        Ok(())
    }
}
