//! Repository trait for user account persistence.

use crate::domain::entities::{NewUser, UniqueField, User, UserField};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of a registration availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub user_name_free: bool,
    pub email_free: bool,
}

/// Repository interface for user accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUserRepository`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Reports whether a user name and an email are still unclaimed.
    ///
    /// Both lookups are independent; a caller may learn that both are taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn can_register(&self, user_name: &str, email: &str) -> Result<Availability, AppError>;

    /// Finds a user by email when `login` contains `@`, by user name otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError>;

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Returns true if a user other than `exclude_id` holds `value` in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_excluding(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: i64,
    ) -> Result<bool, AppError>;

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the user name or email is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Persists only the listed fields of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, user: &User, fields: &[UserField]) -> Result<(), AppError>;

    /// Lists users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;
}
