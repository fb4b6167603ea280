//! Gravatar key helpers.

use md5::{Digest, Md5};

/// Lowercase hex MD5 of `value`.
pub fn encode_md5(value: &str) -> String {
    hex::encode(Md5::digest(value.as_bytes()))
}

/// Turns an email-like gravatar value into its MD5 key.
///
/// Values without `@` are assumed to already be a key and are returned as-is.
pub fn gravatar_key(value: &str) -> String {
    if value.contains('@') {
        encode_md5(value)
    } else {
        value.to_string()
    }
}
