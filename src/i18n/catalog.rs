//! JSON-file message catalogs.
//!
//! Each language lives in `<dir>/locale_<lang>.json`. Nested objects are
//! flattened into dotted ids, so `{"auth": {"login_email": "Email"}}` defines
//! `auth.login_email`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{MessageArg, Translator, format_message};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path} must contain a JSON object at the top level")]
    NotAnObject { path: PathBuf },
    #[error("no languages configured")]
    Empty,
}

/// Messages for every configured language.
#[derive(Debug, Default)]
pub struct Catalog {
    langs: Vec<String>,
    messages: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `locale_<lang>.json` for each language in order.
    ///
    /// The first language becomes the fallback for unknown language tags.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if `langs` is empty or a file is missing or malformed.
    pub fn from_dir(dir: impl AsRef<Path>, langs: &[String]) -> Result<Self, CatalogError> {
        if langs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut catalog = Self::new();
        for lang in langs {
            let path = dir.as_ref().join(format!("locale_{}.json", lang));
            let raw = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let value: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;
            let Value::Object(_) = value else {
                return Err(CatalogError::NotAnObject { path });
            };

            let mut messages = HashMap::new();
            flatten("", &value, &mut messages);
            debug!("Loaded {} messages for {}", messages.len(), lang);
            catalog = catalog.with_messages(lang, messages);
        }

        Ok(catalog)
    }

    /// Adds (or extends) a language with the given messages.
    pub fn with_messages<I, K, V>(mut self, lang: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if !self.langs.iter().any(|l| l == lang) {
            self.langs.push(lang.to_string());
        }
        self.messages
            .entry(lang.to_string())
            .or_default()
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn langs(&self) -> &[String] {
        &self.langs
    }

    /// Looks up a raw message without formatting.
    pub fn get(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// Returns a translator for `lang`, falling back to the first language.
    pub fn locale(self: &Arc<Self>, lang: &str) -> Locale {
        let lang = if self.langs.iter().any(|l| l == lang) {
            lang.to_string()
        } else {
            let fallback = self.langs.first().cloned().unwrap_or_default();
            warn!("Unknown language '{}', using '{}'", lang, fallback);
            fallback
        };

        Locale {
            lang,
            catalog: Arc::clone(self),
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let id = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&id, child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// A [`Catalog`] bound to one language.
#[derive(Debug, Clone)]
pub struct Locale {
    lang: String,
    catalog: Arc<Catalog>,
}

impl Translator for Locale {
    fn lang(&self) -> &str {
        &self.lang
    }

    fn langs(&self) -> &[String] {
        self.catalog.langs()
    }

    fn tr(&self, key: &str, args: &[MessageArg]) -> String {
        let template = self.catalog.get(&self.lang, key).unwrap_or(key);
        format_message(template, args)
    }
}
