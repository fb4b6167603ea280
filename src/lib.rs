//! # Account Forms
//!
//! Server-side forms for a web application's user-account flows:
//! registration, sign-in, password recovery and reset, password change,
//! profile settings and the administrator's user editor.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - `User` entity, repository trait, password hashing
//! - **Forms** ([`forms`]) - Field rules, cross-field checks, label/help/placeholder lookups
//! - **Localization** ([`i18n`]) - Translator interface and JSON message catalogs
//! - **Application Layer** ([`application`]) - Account use cases built on the forms
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL and in-memory storage
//!
//! ## Validation
//!
//! ```no_run
//! # async fn demo() -> Result<(), account_forms::AppError> {
//! use std::sync::Arc;
//! use account_forms::forms::{RegisterForm, validate};
//! use account_forms::infrastructure::persistence::MemoryUserRepository;
//!
//! let users = Arc::new(MemoryUserRepository::new());
//! let mut form = RegisterForm {
//!     user_name: "alice".into(),
//!     email: "alice@example.com".into(),
//!     password: "abcd".into(),
//!     password_re: "abcd".into(),
//! };
//! validate(&mut form, users.as_ref()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Loaded from environment variables via [`config::Config`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod forms;
pub mod i18n;
pub mod infrastructure;
pub mod telemetry;
pub mod utils;

pub use error::AppError;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::AccountService;
    pub use crate::domain::entities::{NewUser, User, UserField};
    pub use crate::domain::repositories::UserRepository;
    pub use crate::error::AppError;
    pub use crate::forms::{
        ForgotForm, Form, LoginForm, PasswordForm, ProfileForm, RegisterForm, ResetPwdForm,
        UserAdminForm, validate,
    };
    pub use crate::i18n::{Catalog, Locale, Translator};
    pub use crate::infrastructure::persistence::{MemoryUserRepository, PgUserRepository};
}
