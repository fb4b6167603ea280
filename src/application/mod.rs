//! Application layer services implementing the account use cases.
//!
//! Services consume the [`crate::domain::repositories::UserRepository`] trait,
//! run each incoming form through [`crate::forms::validate`] and persist the
//! outcome.
//!
//! # Available Services
//!
//! - [`services::account_service::AccountService`] - Registration, sign-in,
//!   password recovery, profile and admin edits

pub mod services;
