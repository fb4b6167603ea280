//! Message catalog interface used to render form labels, help text and errors.
//!
//! Forms only carry message ids; a [`Translator`] turns them into text for the
//! request's language. [`Locale`] is the JSON-catalog-backed implementation.

pub mod catalog;

pub use catalog::{Catalog, CatalogError, Locale};

use std::fmt;

/// A positional argument substituted into a message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageArg {
    Int(i64),
    Text(String),
}

impl fmt::Display for MessageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageArg::Int(n) => write!(f, "{}", n),
            MessageArg::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MessageArg {
    fn from(n: i64) -> Self {
        MessageArg::Int(n)
    }
}

impl From<i32> for MessageArg {
    fn from(n: i32) -> Self {
        MessageArg::Int(n.into())
    }
}

impl From<&str> for MessageArg {
    fn from(s: &str) -> Self {
        MessageArg::Text(s.to_string())
    }
}

impl From<String> for MessageArg {
    fn from(s: String) -> Self {
        MessageArg::Text(s)
    }
}

/// Resolves message ids for one language.
pub trait Translator: Send + Sync {
    /// Language tag this translator renders, e.g. `en-US`.
    fn lang(&self) -> &str;

    /// All languages known to the catalog, in display order.
    fn langs(&self) -> &[String];

    /// Translates `key`, substituting `args` into its printf-style verbs.
    ///
    /// Unknown keys are formatted as if the key itself were the message.
    fn tr(&self, key: &str, args: &[MessageArg]) -> String;
}

/// Substitutes `%d`, `%s` and `%v` verbs in order; `%%` is a literal percent.
///
/// Verbs without a matching argument are left as written.
pub fn format_message(template: &str, args: &[MessageArg]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(verb @ ('d' | 's' | 'v')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('%');
                        out.push(verb);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}
