//! Administrator's user editor.

use async_trait::async_trait;
use serde::Deserialize;
use validator::ValidationErrors;

use super::rules::{FieldSpec, FieldValue, InputKind, Rule, field_error};
use super::Form;
use crate::domain::entities::{NewUser, UniqueField, User, UserField};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::avatar::gravatar_key;

/// Create or edit any account.
///
/// `create` and `id` travel as hidden inputs: `create` selects between
/// creating a new record and editing record `id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserAdminForm {
    pub create: bool,
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub public_email: bool,
    pub nick_name: String,
    pub url: String,
    pub info: String,
    pub gr_email: String,
    pub followers: i32,
    pub following: i32,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_forbid: bool,
}

const ADMIN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "user_name",
        InputKind::Text,
        &[Rule::Required, Rule::AlphaDash, Rule::MinSize(5), Rule::MaxSize(30)],
    ),
    FieldSpec::new(
        "email",
        InputKind::Text,
        &[Rule::Required, Rule::Email, Rule::MaxSize(100)],
    ),
    FieldSpec::new("public_email", InputKind::Checkbox, &[]),
    FieldSpec::new("nick_name", InputKind::Text, &[Rule::Required, Rule::MaxSize(30)]),
    FieldSpec::new("url", InputKind::Text, &[Rule::MaxSize(100)]),
    FieldSpec::new("info", InputKind::Textarea, &[Rule::MaxSize(255)]),
    FieldSpec::new("gr_email", InputKind::Text, &[Rule::Required, Rule::MaxSize(80)]),
    FieldSpec::new("followers", InputKind::Number, &[]),
    FieldSpec::new("following", InputKind::Number, &[]),
    FieldSpec::new("is_admin", InputKind::Checkbox, &[]),
    FieldSpec::new("is_active", InputKind::Checkbox, &[]),
    FieldSpec::new("is_forbid", InputKind::Checkbox, &[]),
];

impl UserAdminForm {
    /// Fills the editor from a stored account.
    pub fn set_from_user(&mut self, user: &User) {
        self.id = user.id;
        self.user_name = user.user_name.clone();
        self.email = user.email.clone();
        self.public_email = user.public_email;
        self.nick_name = user.nick_name.clone();
        self.url = user.url.clone();
        self.info = user.info.clone();
        self.gr_email = user.gr_email.clone();
        self.followers = user.followers;
        self.following = user.following;
        self.is_admin = user.is_admin;
        self.is_active = user.is_active;
        self.is_forbid = user.is_forbid;
    }

    /// Copies every editable field onto `user`, hashing an email-like `gr_email`.
    pub fn set_to_user(&mut self, user: &mut User) {
        self.gr_email = gravatar_key(&self.gr_email);

        user.user_name = self.user_name.clone();
        user.email = self.email.clone();
        user.public_email = self.public_email;
        user.nick_name = self.nick_name.clone();
        user.url = self.url.clone();
        user.info = self.info.clone();
        user.gr_email = self.gr_email.clone();
        user.followers = self.followers;
        user.following = self.following;
        user.is_admin = self.is_admin;
        user.is_active = self.is_active;
        user.is_forbid = self.is_forbid;
    }

    /// Editable fields whose form value differs from `user`.
    ///
    /// `gr_email` is compared after MD5 keying, so retyping the same address
    /// is not a change.
    pub fn changes(&self, user: &User) -> Vec<UserField> {
        let candidates = [
            (UserField::UserName, self.user_name != user.user_name),
            (UserField::Email, self.email != user.email),
            (UserField::PublicEmail, self.public_email != user.public_email),
            (UserField::NickName, self.nick_name != user.nick_name),
            (UserField::Url, self.url != user.url),
            (UserField::Info, self.info != user.info),
            (
                UserField::GrEmail,
                gravatar_key(&self.gr_email) != user.gr_email,
            ),
            (UserField::Followers, self.followers != user.followers),
            (UserField::Following, self.following != user.following),
            (UserField::IsAdmin, self.is_admin != user.is_admin),
            (UserField::IsActive, self.is_active != user.is_active),
            (UserField::IsForbid, self.is_forbid != user.is_forbid),
        ];

        candidates
            .into_iter()
            .filter_map(|(field, changed)| changed.then_some(field))
            .collect()
    }

    /// Creation data for a new account. The password is left empty.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            user_name: self.user_name.clone(),
            nick_name: self.nick_name.clone(),
            email: self.email.clone(),
            url: self.url.clone(),
            info: self.info.clone(),
            gr_email: gravatar_key(&self.gr_email),
            public_email: self.public_email,
            lang_adds: -1,
            is_admin: self.is_admin,
            is_active: self.is_active,
            is_forbid: self.is_forbid,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Form for UserAdminForm {
    fn fields(&self) -> &'static [FieldSpec] {
        ADMIN_FIELDS
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "user_name" => FieldValue::Text(&self.user_name),
            "email" => FieldValue::Text(&self.email),
            "public_email" => FieldValue::Bool(self.public_email),
            "nick_name" => FieldValue::Text(&self.nick_name),
            "url" => FieldValue::Text(&self.url),
            "info" => FieldValue::Text(&self.info),
            "gr_email" => FieldValue::Text(&self.gr_email),
            "followers" => FieldValue::Int(self.followers.into()),
            "following" => FieldValue::Int(self.following.into()),
            "is_admin" => FieldValue::Bool(self.is_admin),
            "is_active" => FieldValue::Bool(self.is_active),
            "is_forbid" => FieldValue::Bool(self.is_forbid),
            _ => return None,
        })
    }

    async fn check(
        &mut self,
        users: &dyn UserRepository,
        errors: &mut ValidationErrors,
    ) -> Result<(), AppError> {
        if users
            .exists_excluding(UniqueField::UserName, &self.user_name, self.id)
            .await?
        {
            errors.add(
                "user_name",
                field_error("username_already_taken", "auth.username_already_taken"),
            );
        }

        if users
            .exists_excluding(UniqueField::Email, &self.email, self.id)
            .await?
        {
            errors.add(
                "email",
                field_error("email_already_taken", "auth.email_already_taken"),
            );
        }

        Ok(())
    }
}
