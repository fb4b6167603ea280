//! Forms for a signed-in user's own account settings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::ValidationErrors;

use super::rules::{FieldSpec, FieldValue, InputKind, Rule, field_error};
use super::{FieldText, FieldTexts, Form, keys, passwords_match};
use crate::domain::entities::{User, UserField};
use crate::domain::password::verify_password;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::i18n::Translator;
use crate::utils::avatar::gravatar_key;

/// One `<option>` of a select input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Public profile settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub nick_name: String,
    pub url: String,
    pub info: String,
    pub email: String,
    pub public_email: bool,
    pub gr_email: String,
    pub lang: i32,
    pub lang_adds: i32,
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("nick_name", InputKind::Text, &[Rule::Required, Rule::MaxSize(30)]),
    FieldSpec::new("url", InputKind::Text, &[Rule::MaxSize(100)]),
    FieldSpec::new("info", InputKind::Textarea, &[Rule::MaxSize(255)]),
    FieldSpec::new(
        "email",
        InputKind::Text,
        &[Rule::Required, Rule::Email, Rule::MaxSize(100)],
    ),
    FieldSpec::new("public_email", InputKind::Checkbox, &[]),
    FieldSpec::new("gr_email", InputKind::Text, &[Rule::Required, Rule::MaxSize(80)]),
    FieldSpec::new("lang", InputKind::Select, &[Rule::Required]),
    FieldSpec::new("lang_adds", InputKind::Select, &[]),
];

impl ProfileForm {
    /// Fills the form from the stored account.
    pub fn set_from_user(&mut self, user: &User) {
        self.nick_name = user.nick_name.clone();
        self.url = user.url.clone();
        self.info = user.info.clone();
        self.email = user.email.clone();
        self.public_email = user.public_email;
        self.gr_email = user.gr_email.clone();
        self.lang = user.lang;
        self.lang_adds = user.lang_adds;
    }

    /// Fields whose form value differs from `user`.
    pub fn changes(&self, user: &User) -> Vec<UserField> {
        let mut changes = Vec::new();
        if self.nick_name != user.nick_name {
            changes.push(UserField::NickName);
        }
        if self.url != user.url {
            changes.push(UserField::Url);
        }
        if self.info != user.info {
            changes.push(UserField::Info);
        }
        if self.email != user.email {
            changes.push(UserField::Email);
        }
        if self.public_email != user.public_email {
            changes.push(UserField::PublicEmail);
        }
        if self.gr_email != user.gr_email {
            changes.push(UserField::GrEmail);
        }
        if self.lang != user.lang {
            changes.push(UserField::Lang);
        }
        if self.lang_adds != user.lang_adds {
            changes.push(UserField::LangAdds);
        }
        changes
    }

    fn apply_to(&self, user: &mut User) {
        user.nick_name = self.nick_name.clone();
        user.url = self.url.clone();
        user.info = self.info.clone();
        user.email = self.email.clone();
        user.public_email = self.public_email;
        user.gr_email = self.gr_email.clone();
        user.lang = self.lang;
        user.lang_adds = self.lang_adds;
    }

    /// Writes the changed profile fields to `user` and persists them.
    ///
    /// An email-like `gr_email` is replaced by its MD5 key first. A changed
    /// email deactivates the account until it is confirmed again. Nothing is
    /// persisted when no field changed.
    ///
    /// # Errors
    ///
    /// Propagates the repository's update error unchanged.
    pub async fn save_user_profile(
        &mut self,
        user: &mut User,
        users: &dyn UserRepository,
    ) -> Result<(), AppError> {
        self.gr_email = gravatar_key(&self.gr_email);

        let mut changes = self.changes(user);
        if changes.is_empty() {
            return Ok(());
        }

        if user.email != self.email {
            user.is_active = false;
            changes.push(UserField::IsActive);
        }

        self.apply_to(user);
        users.update(user, &changes).await
    }

    /// Options for the `lang` select: `(language, index)`.
    pub fn lang_select_data(&self, tr: &dyn Translator) -> Vec<SelectOption> {
        tr.langs()
            .iter()
            .enumerate()
            .map(|(i, lang)| SelectOption {
                label: lang.clone(),
                value: i.to_string(),
            })
            .collect()
    }

    /// Options for the `lang_adds` select, led by an "all languages" entry.
    pub fn lang_adds_select_data(&self, tr: &dyn Translator) -> Vec<SelectOption> {
        let mut data = Vec::with_capacity(tr.langs().len() + 1);
        data.push(SelectOption {
            label: tr.tr("all_language", &[]),
            value: "-1".to_string(),
        });
        data.extend(self.lang_select_data(tr));
        data
    }
}

#[async_trait]
impl Form for ProfileForm {
    fn fields(&self) -> &'static [FieldSpec] {
        PROFILE_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "nick_name" => FieldValue::Text(&self.nick_name),
            "url" => FieldValue::Text(&self.url),
            "info" => FieldValue::Text(&self.info),
            "email" => FieldValue::Text(&self.email),
            "public_email" => FieldValue::Bool(self.public_email),
            "gr_email" => FieldValue::Text(&self.gr_email),
            "lang" => FieldValue::Int(self.lang.into()),
            "lang_adds" => FieldValue::Int(self.lang_adds.into()),
            _ => return None,
        })
    }

    fn labels(&self) -> FieldTexts {
        keys([
            ("lang", "auth.profile_lang"),
            ("lang_adds", "auth.profile_lang_additional"),
            ("nick_name", "model.user_nickname"),
            ("public_email", "auth.profile_publicemail"),
            ("gr_email", "auth.profile_gremail"),
            ("url", "auth.profile_url"),
        ])
    }

    fn helps(&self, tr: &dyn Translator) -> FieldTexts {
        FieldTexts::from([
            ("gr_email", FieldText::Key("auth.profile_gremail_help")),
            (
                "info",
                FieldText::Text(tr.tr("Max-length is %d", &[255.into()])),
            ),
        ])
    }

    fn placeholders(&self) -> FieldTexts {
        keys([
            ("gr_email", "auth.plz_enter_gremail"),
            ("url", "auth.plz_enter_website"),
            ("info", "auth.plz_enter_your_info"),
        ])
    }
}

/// Password change for a signed-in user.
///
/// `user` must be attached before validation; the old password is checked
/// against its stored hash.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub password_old: String,
    pub password: String,
    pub password_re: String,
    #[serde(skip)]
    pub user: Option<User>,
}

const PASSWORD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("password_old", InputKind::Password, &[Rule::Required]),
    FieldSpec::new(
        "password",
        InputKind::Password,
        &[Rule::Required, Rule::MinSize(4), Rule::MaxSize(30)],
    ),
    FieldSpec::new(
        "password_re",
        InputKind::Password,
        &[Rule::Required, Rule::MinSize(4), Rule::MaxSize(30)],
    ),
];

impl PasswordForm {
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

#[async_trait]
impl Form for PasswordForm {
    fn fields(&self) -> &'static [FieldSpec] {
        PASSWORD_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "password_old" => FieldValue::Text(&self.password_old),
            "password" => FieldValue::Text(&self.password),
            "password_re" => FieldValue::Text(&self.password_re),
            _ => return None,
        })
    }

    fn labels(&self) -> FieldTexts {
        keys([
            ("password_old", "auth.old_password"),
            ("password", "auth.new_password"),
            ("password_re", "auth.retype_password"),
        ])
    }

    fn placeholders(&self) -> FieldTexts {
        keys([
            ("password_old", "auth.plz_enter_old_password"),
            ("password", "auth.plz_enter_new_password"),
            ("password_re", "auth.plz_reenter_password"),
        ])
    }

    async fn check(
        &mut self,
        _users: &dyn UserRepository,
        errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        if !passwords_match(&self.password, &self.password_re, errors) {
            return Ok(());
        }

        let Some(user) = &self.user else {
            return Err(AppError::internal(
                "Password form has no user attached",
                json!({}),
            ));
        };

        if !verify_password(&self.password_old, &user.password) {
            errors.add(
                "password_old",
                field_error("old_password_wrong", "auth.old_password_wrong"),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewUser;
    use crate::domain::password::hash_password;
    use crate::domain::repositories::MockUserRepository;
    use crate::forms::{check_fields, messages_for, validate};
    use crate::i18n::Catalog;
    use crate::utils::avatar::encode_md5;
    use std::sync::Arc;

    fn stored_user() -> User {
        User::from_new(
            42,
            NewUser {
                user_name: "alice".to_string(),
                nick_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: hash_password("abcd").unwrap(),
                gr_email: encode_md5("alice@example.com"),
                lang_adds: -1,
                is_active: true,
                ..Default::default()
            },
        )
    }

    fn profile_of(user: &User) -> ProfileForm {
        let mut form = ProfileForm::default();
        form.set_from_user(user);
        form
    }

    #[tokio::test]
    async fn test_save_profile_without_changes_skips_update() {
        // No update expectation: any call panics.
        let users = MockUserRepository::new();
        let mut user = stored_user();
        let mut form = profile_of(&user);

        form.save_user_profile(&mut user, &users).await.unwrap();

        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_save_profile_email_change_deactivates() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(|user, fields| {
                !user.is_active
                    && user.email == "new@example.com"
                    && fields == [UserField::Email, UserField::IsActive]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut user = stored_user();
        let mut form = profile_of(&user);
        form.email = "new@example.com".to_string();

        form.save_user_profile(&mut user, &users).await.unwrap();

        assert!(!user.is_active);
        assert_eq!(user.email, "new@example.com");
    }

    #[tokio::test]
    async fn test_save_profile_hashes_gravatar_email() {
        let expected = encode_md5("other@example.com");
        let persisted = expected.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(move |user, fields| user.gr_email == persisted && fields == [UserField::GrEmail])
            .times(1)
            .returning(|_, _| Ok(()));

        let mut user = stored_user();
        let mut form = profile_of(&user);
        form.gr_email = "other@example.com".to_string();

        form.save_user_profile(&mut user, &users).await.unwrap();

        assert_eq!(user.gr_email, expected);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_save_profile_same_gravatar_email_is_not_a_change() {
        let users = MockUserRepository::new();
        let mut user = stored_user();
        let mut form = profile_of(&user);
        form.gr_email = "alice@example.com".to_string();

        form.save_user_profile(&mut user, &users).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_profile_update_error_propagates() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .returning(|_, _| Err(AppError::not_found("User not found", json!({}))));

        let mut user = stored_user();
        let mut form = profile_of(&user);
        form.nick_name = "Al".to_string();

        let err = form.save_user_profile(&mut user, &users).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_profile_changes() {
        let user = stored_user();
        let mut form = profile_of(&user);
        assert!(form.changes(&user).is_empty());

        form.url = "https://alice.dev".to_string();
        form.lang = 1;
        form.public_email = true;

        assert_eq!(
            form.changes(&user),
            vec![UserField::Url, UserField::PublicEmail, UserField::Lang]
        );
    }

    #[test]
    fn test_profile_field_rules() {
        let form = ProfileForm {
            nick_name: String::new(),
            info: "x".repeat(256),
            email: "alice@example.com".to_string(),
            gr_email: "alice@example.com".to_string(),
            lang: -1,
            lang_adds: -1,
            ..Default::default()
        };
        let errors = check_fields(&form);

        assert_eq!(messages_for(&errors, "nick_name"), vec!["valid.required"]);
        assert_eq!(messages_for(&errors, "info"), vec!["valid.max_size"]);
        assert_eq!(messages_for(&errors, "lang"), vec!["valid.required"]);
        assert!(messages_for(&errors, "lang_adds").is_empty());
        assert!(messages_for(&errors, "url").is_empty());
    }

    #[test]
    fn test_profile_whitespace_counts_toward_max_size() {
        let form = ProfileForm {
            nick_name: "Alice".to_string(),
            url: " ".repeat(150),
            info: " ".repeat(300),
            email: "alice@example.com".to_string(),
            gr_email: "alice@example.com".to_string(),
            lang: 0,
            lang_adds: -1,
            ..Default::default()
        };
        let errors = check_fields(&form);

        assert_eq!(messages_for(&errors, "url"), vec!["valid.max_size"]);
        assert_eq!(messages_for(&errors, "info"), vec!["valid.max_size"]);
    }

    #[test]
    fn test_lang_select_data() {
        let catalog = Arc::new(
            Catalog::new()
                .with_messages("en-US", [("all_language", "All languages")])
                .with_messages("zh-CN", [("all_language", "所有语言")]),
        );
        let locale = catalog.locale("en-US");
        let form = ProfileForm::default();

        let langs = form.lang_select_data(&locale);
        assert_eq!(langs.len(), 2);
        assert_eq!(langs[1].label, "zh-CN");
        assert_eq!(langs[1].value, "1");

        let adds = form.lang_adds_select_data(&locale);
        assert_eq!(adds.len(), 3);
        assert_eq!(adds[0].label, "All languages");
        assert_eq!(adds[0].value, "-1");
        assert_eq!(adds[1].value, "0");
    }

    #[test]
    fn test_profile_info_help_is_interpolated() {
        let catalog = Arc::new(Catalog::new().with_messages("en-US", [("all_language", "All")]));
        let helps = ProfileForm::default().helps(&catalog.locale("en-US"));

        assert_eq!(
            helps["info"],
            FieldText::Text("Max-length is 255".to_string())
        );
        assert_eq!(
            helps["gr_email"],
            FieldText::Key("auth.profile_gremail_help")
        );
    }

    fn password_form(old: &str, new: &str, re: &str) -> PasswordForm {
        PasswordForm {
            password_old: old.to_string(),
            password: new.to_string(),
            password_re: re.to_string(),
            user: None,
        }
        .with_user(stored_user())
    }

    #[tokio::test]
    async fn test_password_mismatch() {
        let users = MockUserRepository::new();
        let mut form = password_form("abcd", "abcd", "abce");

        let err = validate(&mut form, &users).await.unwrap_err();
        let errors = err.form_errors().unwrap();

        assert_eq!(
            messages_for(errors, "password_re"),
            vec!["auth.repassword_not_match"]
        );
        // Mismatch stops the old password check.
        assert!(messages_for(errors, "password_old").is_empty());
    }

    #[tokio::test]
    async fn test_password_old_wrong() {
        let users = MockUserRepository::new();
        let mut form = password_form("wrong", "efgh", "efgh");

        let err = validate(&mut form, &users).await.unwrap_err();

        assert_eq!(
            messages_for(err.form_errors().unwrap(), "password_old"),
            vec!["auth.old_password_wrong"]
        );
    }

    #[tokio::test]
    async fn test_password_old_correct() {
        let users = MockUserRepository::new();
        let mut form = password_form("abcd", "abcd", "abcd");

        assert!(validate(&mut form, &users).await.is_ok());
    }

    #[tokio::test]
    async fn test_password_form_without_user() {
        let users = MockUserRepository::new();
        let mut form = PasswordForm {
            password_old: "abcd".to_string(),
            password: "efgh".to_string(),
            password_re: "efgh".to_string(),
            user: None,
        };

        let err = validate(&mut form, &users).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
