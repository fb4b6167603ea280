//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewUser, UniqueField, User, UserField};
use crate::domain::repositories::{Availability, UserRepository};
use crate::error::AppError;
use serde_json::json;

const USER_COLUMNS: &str = "id, user_name, nick_name, email, password, url, info, gr_email, \
     public_email, lang, lang_adds, followers, following, is_admin, is_active, is_forbid, \
     created, updated";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    nick_name: String,
    email: String,
    password: String,
    url: String,
    info: String,
    gr_email: String,
    public_email: bool,
    lang: i32,
    lang_adds: i32,
    followers: i32,
    following: i32,
    is_admin: bool,
    is_active: bool,
    is_forbid: bool,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_name: row.user_name,
            nick_name: row.nick_name,
            email: row.email,
            password: row.password,
            url: row.url,
            info: row.info,
            gr_email: row.gr_email,
            public_email: row.public_email,
            lang: row.lang,
            lang_adds: row.lang_adds,
            followers: row.followers,
            following: row.following,
            is_admin: row.is_admin,
            is_active: row.is_active,
            is_forbid: row.is_forbid,
            created: row.created,
            updated: row.updated,
        }
    }
}

/// PostgreSQL repository for user accounts.
///
/// Queries are bound at runtime; column names in dynamic SQL only ever come
/// from [`UserField::column`] and [`UniqueField::column`].
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn can_register(&self, user_name: &str, email: &str) -> Result<Availability, AppError> {
        let (user_name_free, email_free) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                NOT EXISTS (SELECT 1 FROM users WHERE user_name = $1),
                NOT EXISTS (SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(user_name)
        .bind(email)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Availability {
            user_name_free,
            email_free,
        })
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let column = if login.contains('@') {
            UserField::Email.column()
        } else {
            UserField::UserName.column()
        };
        self.find_by_column(column, login).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }

    async fn exists_excluding(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: i64,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM users WHERE {} = $1 AND id <> $2)",
            field.column()
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .bind(exclude_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (
                user_name, nick_name, email, password, url, info, gr_email,
                public_email, lang, lang_adds, is_admin, is_active, is_forbid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(new_user.user_name)
            .bind(new_user.nick_name)
            .bind(new_user.email)
            .bind(new_user.password)
            .bind(new_user.url)
            .bind(new_user.info)
            .bind(new_user.gr_email)
            .bind(new_user.public_email)
            .bind(new_user.lang)
            .bind(new_user.lang_adds)
            .bind(new_user.is_admin)
            .bind(new_user.is_active)
            .bind(new_user.is_forbid)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn update(&self, user: &User, fields: &[UserField]) -> Result<(), AppError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut set = builder.separated(", ");
        for field in fields {
            set.push(format!("{} = ", field.column()));
            match field {
                UserField::UserName => set.push_bind_unseparated(user.user_name.clone()),
                UserField::NickName => set.push_bind_unseparated(user.nick_name.clone()),
                UserField::Email => set.push_bind_unseparated(user.email.clone()),
                UserField::Password => set.push_bind_unseparated(user.password.clone()),
                UserField::Url => set.push_bind_unseparated(user.url.clone()),
                UserField::Info => set.push_bind_unseparated(user.info.clone()),
                UserField::GrEmail => set.push_bind_unseparated(user.gr_email.clone()),
                UserField::PublicEmail => set.push_bind_unseparated(user.public_email),
                UserField::Lang => set.push_bind_unseparated(user.lang),
                UserField::LangAdds => set.push_bind_unseparated(user.lang_adds),
                UserField::Followers => set.push_bind_unseparated(user.followers),
                UserField::Following => set.push_bind_unseparated(user.following),
                UserField::IsAdmin => set.push_bind_unseparated(user.is_admin),
                UserField::IsActive => set.push_bind_unseparated(user.is_active),
                UserField::IsForbid => set.push_bind_unseparated(user.is_forbid),
            };
        }
        set.push("updated = NOW()");
        builder.push(" WHERE id = ").push_bind(user.id);

        let result = builder.build().execute(self.pool.as_ref()).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "User not found",
                json!({ "id": user.id }),
            ));
        }

        tracing::debug!("Updated {} field(s) of user {}", fields.len(), user.id);
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
