//! User account entity and the field identifiers used for partial updates.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user account.
///
/// `password` holds the Argon2 PHC string, never the plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub nick_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub url: String,
    pub info: String,
    /// Gravatar key: the MD5 hex of an email, or a raw value typed by the user.
    pub gr_email: String,
    pub public_email: bool,
    /// Index into the configured language list.
    pub lang: i32,
    /// Additional content language index, `-1` for all languages.
    pub lang_adds: i32,
    pub followers: i32,
    pub following: i32,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_forbid: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl User {
    /// Builds a persisted user from creation data and the id assigned by storage.
    pub fn from_new(id: i64, new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_name: new.user_name,
            nick_name: new.nick_name,
            email: new.email,
            password: new.password,
            url: new.url,
            info: new.info,
            gr_email: new.gr_email,
            public_email: new.public_email,
            lang: new.lang,
            lang_adds: new.lang_adds,
            followers: 0,
            following: 0,
            is_admin: new.is_admin,
            is_active: new.is_active,
            is_forbid: new.is_forbid,
            created: now,
            updated: now,
        }
    }

    /// Returns true if the account may sign in.
    pub fn can_login(&self) -> bool {
        !self.is_forbid
    }
}

/// Input data for creating a new user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub user_name: String,
    pub nick_name: String,
    pub email: String,
    pub password: String,
    pub url: String,
    pub info: String,
    pub gr_email: String,
    pub public_email: bool,
    pub lang: i32,
    pub lang_adds: i32,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_forbid: bool,
}

/// A persisted `User` column.
///
/// A list of these forms the changed-field set passed to
/// [`crate::domain::repositories::UserRepository::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UserField {
    UserName,
    NickName,
    Email,
    Password,
    Url,
    Info,
    GrEmail,
    PublicEmail,
    Lang,
    LangAdds,
    Followers,
    Following,
    IsAdmin,
    IsActive,
    IsForbid,
}

impl UserField {
    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            UserField::UserName => "user_name",
            UserField::NickName => "nick_name",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::Url => "url",
            UserField::Info => "info",
            UserField::GrEmail => "gr_email",
            UserField::PublicEmail => "public_email",
            UserField::Lang => "lang",
            UserField::LangAdds => "lang_adds",
            UserField::Followers => "followers",
            UserField::Following => "following",
            UserField::IsAdmin => "is_admin",
            UserField::IsActive => "is_active",
            UserField::IsForbid => "is_forbid",
        }
    }

    /// Copies this field's value from `src` onto `dst`.
    pub fn copy(self, src: &User, dst: &mut User) {
        match self {
            UserField::UserName => dst.user_name = src.user_name.clone(),
            UserField::NickName => dst.nick_name = src.nick_name.clone(),
            UserField::Email => dst.email = src.email.clone(),
            UserField::Password => dst.password = src.password.clone(),
            UserField::Url => dst.url = src.url.clone(),
            UserField::Info => dst.info = src.info.clone(),
            UserField::GrEmail => dst.gr_email = src.gr_email.clone(),
            UserField::PublicEmail => dst.public_email = src.public_email,
            UserField::Lang => dst.lang = src.lang,
            UserField::LangAdds => dst.lang_adds = src.lang_adds,
            UserField::Followers => dst.followers = src.followers,
            UserField::Following => dst.following = src.following,
            UserField::IsAdmin => dst.is_admin = src.is_admin,
            UserField::IsActive => dst.is_active = src.is_active,
            UserField::IsForbid => dst.is_forbid = src.is_forbid,
        }
    }
}

/// Columns that must stay unique across accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    UserName,
    Email,
}

impl UniqueField {
    pub fn column(self) -> &'static str {
        match self {
            UniqueField::UserName => UserField::UserName.column(),
            UniqueField::Email => UserField::Email.column(),
        }
    }

    /// Reads this field from a user record.
    pub fn value_of(self, user: &User) -> &str {
        match self {
            UniqueField::UserName => &user.user_name,
            UniqueField::Email => &user.email,
        }
    }
}
