//! Message catalogs and the sources they are loaded from.
//!
//! A catalog is a nested key/value tree of message templates for one locale.
//! Templates are addressed by dot-path keys (`validation.too_small.string`).

use crate::error::{MessageError, MessageResult};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

const EMBEDDED_SV: &str = include_str!("../catalogs/sv.json");
const EMBEDDED_EN: &str = include_str!("../catalogs/en.json");

/// An immutable message tree for one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    locale: String,
    tree: Value,
}

impl Catalog {
    /// Wraps a JSON tree. The root must be an object.
    pub fn from_value(locale: impl Into<String>, tree: Value) -> MessageResult<Self> {
        let locale = locale.into();
        if !tree.is_object() {
            return Err(MessageError::parse(locale, "catalog root must be a table"));
        }
        Ok(Self { locale, tree })
    }

    /// Parses a JSON catalog.
    pub fn from_json(locale: impl Into<String>, text: &str) -> MessageResult<Self> {
        let locale = locale.into();
        let tree: Value = serde_json::from_str(text).map_err(|e| MessageError::parse(&locale, e))?;
        Self::from_value(locale, tree)
    }

    /// Parses a TOML catalog.
    pub fn from_toml(locale: impl Into<String>, text: &str) -> MessageResult<Self> {
        let locale = locale.into();
        let tree: Value = toml::from_str(text).map_err(|e| MessageError::parse(&locale, e))?;
        Self::from_value(locale, tree)
    }

    /// Locale tag of this catalog.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Looks up a template by dot-path key.
    ///
    /// Returns `None` for missing keys and for keys that address a subtree.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        key.split('.')
            .try_fold(&self.tree, |node, segment| node.get(segment))
            .and_then(Value::as_str)
    }

    /// Returns `true` if `key` addresses a template.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Where catalogs come from.
///
/// `load` is used on the async resolution path. `load_sync` backs the
/// synchronous fast path, which only ever needs the default locale.
pub trait CatalogSource: Send + Sync + fmt::Debug {
    /// Loads the catalog for `locale`.
    fn load<'a>(&'a self, locale: &'a str) -> BoxFuture<'a, MessageResult<Catalog>>;

    /// Loads the catalog for `locale` without awaiting.
    fn load_sync(&self, locale: &str) -> MessageResult<Catalog>;
}

/// The catalogs compiled into the binary (`sv`, `en`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalogs;

impl EmbeddedCatalogs {
    /// Locales with an embedded catalog.
    pub const LOCALES: [&'static str; 2] = ["sv", "en"];
}

impl CatalogSource for EmbeddedCatalogs {
    fn load<'a>(&'a self, locale: &'a str) -> BoxFuture<'a, MessageResult<Catalog>> {
        Box::pin(async move { self.load_sync(locale) })
    }

    fn load_sync(&self, locale: &str) -> MessageResult<Catalog> {
        match locale {
            "sv" => Catalog::from_json(locale, EMBEDDED_SV),
            "en" => Catalog::from_json(locale, EMBEDDED_EN),
            other => Err(MessageError::UnknownLocale(other.to_string())),
        }
    }
}

/// Catalogs read from `<dir>/<locale>.json` or `<dir>/<locale>.toml`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalogs {
    dir: PathBuf,
}

impl DirectoryCatalogs {
    /// Creates a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Catalog directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidates(&self, locale: &str) -> MessageResult<[PathBuf; 2]> {
        if !is_locale_tag(locale) {
            return Err(MessageError::UnknownLocale(locale.to_string()));
        }
        Ok([
            self.dir.join(format!("{locale}.json")),
            self.dir.join(format!("{locale}.toml")),
        ])
    }
}

impl CatalogSource for DirectoryCatalogs {
    fn load<'a>(&'a self, locale: &'a str) -> BoxFuture<'a, MessageResult<Catalog>> {
        Box::pin(async move {
            for path in self.candidates(locale)? {
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => return parse_file(locale, &path, &text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(source) => return Err(MessageError::Io { path, source }),
                }
            }
            Err(MessageError::UnknownLocale(locale.to_string()))
        })
    }

    fn load_sync(&self, locale: &str) -> MessageResult<Catalog> {
        for path in self.candidates(locale)? {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_file(locale, &path, &text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(MessageError::Io { path, source }),
            }
        }
        Err(MessageError::UnknownLocale(locale.to_string()))
    }
}

fn parse_file(locale: &str, path: &Path, text: &str) -> MessageResult<Catalog> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Catalog::from_toml(locale, text),
        _ => Catalog::from_json(locale, text),
    }
}

/// Accepts BCP 47-shaped tags only, so a locale can never name a path outside
/// the catalog directory.
fn is_locale_tag(locale: &str) -> bool {
    !locale.is_empty()
        && locale.len() <= 35
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
