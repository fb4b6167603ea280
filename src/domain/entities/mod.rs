//! Core domain entities.
//!
//! - [`User`] - A registered account
//! - [`NewUser`] - Data for creating an account
//! - [`UserField`] - Column identifiers forming a changed-field set
//! - [`UniqueField`] - Columns checked for uniqueness

pub mod user;

pub use user::{NewUser, UniqueField, User, UserField};
