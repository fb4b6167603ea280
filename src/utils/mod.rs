//! Utility functions shared by forms and the admin tool.
//!
//! - [`avatar`] - Gravatar key hashing

pub mod avatar;
