//! Domain layer containing the account entity and its persistence contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`password`] - Password hashing and verification
//!
//! The domain layer has no dependencies on infrastructure; repository traits
//! are implemented in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod password;
pub mod repositories;
