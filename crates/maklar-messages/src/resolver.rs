//! Message resolution.
//!
//! `(locale, key, params) -> String`. Resolution never fails: a missing key
//! falls back to the default locale, then to the caller's fallback, then to
//! the raw key.
//!
//! Catalogs are loaded lazily and memoized per locale. Concurrent requests
//! for a locale that is not loaded yet share a single in-flight load.

use crate::cache::MessageCache;
use crate::catalog::{Catalog, CatalogSource, EmbeddedCatalogs};
use crate::error::MessageError;
use crate::substitute::{substitute, YesNo};
use dashmap::DashMap;
use futures_util::future::join_all;
use maklar_core::{FieldPath, Params};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Locale used when none is requested or the requested one is unsupported.
pub const DEFAULT_LOCALE: &str = "sv";

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Locale every lookup falls back to.
    pub default_locale: String,
    /// Locales callers may request.
    pub supported_locales: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            supported_locales: EmbeddedCatalogs::LOCALES.iter().map(ToString::to_string).collect(),
        }
    }
}

type CatalogCell = Arc<OnceCell<Arc<Catalog>>>;

/// Resolves message keys to localized, parameter-substituted text.
#[derive(Debug)]
pub struct MessageResolver {
    source: Arc<dyn CatalogSource>,
    cache: Arc<MessageCache>,
    config: ResolverConfig,
    catalogs: DashMap<String, CatalogCell>,
}

impl Default for MessageResolver {
    fn default() -> Self {
        Self::embedded()
    }
}

impl MessageResolver {
    /// Creates a resolver over a catalog source and a shared cache.
    pub fn new(source: Arc<dyn CatalogSource>, cache: Arc<MessageCache>, config: ResolverConfig) -> Self {
        Self {
            source,
            cache,
            config,
            catalogs: DashMap::new(),
        }
    }

    /// Resolver over the embedded `sv`/`en` catalogs with default settings.
    pub fn embedded() -> Self {
        Self::new(
            Arc::new(EmbeddedCatalogs),
            Arc::new(MessageCache::default()),
            ResolverConfig::default(),
        )
    }

    /// The default locale.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    /// Returns `true` if `locale` may be requested.
    #[must_use]
    pub fn is_supported(&self, locale: &str) -> bool {
        self.config.supported_locales.iter().any(|l| l == locale)
    }

    /// The shared message cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<MessageCache> {
        &self.cache
    }

    /// Picks the first supported language from an `Accept-Language` value.
    ///
    /// Tags are tried in header order, first as given and then by their
    /// primary language subtag. Quality weights are ignored.
    #[must_use]
    pub fn negotiate(&self, accept_language: Option<&str>) -> String {
        let Some(header) = accept_language else {
            return self.config.default_locale.clone();
        };
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && *tag != "*")
            .find_map(|tag| {
                let primary = tag.split(['-', '_']).next().unwrap_or(tag);
                [tag, primary]
                    .into_iter()
                    .find(|candidate| self.is_supported(candidate))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.config.default_locale.clone())
    }

    fn effective_locale<'a>(&'a self, locale: &'a str) -> &'a str {
        if self.is_supported(locale) {
            locale
        } else {
            tracing::warn!(
                locale,
                fallback = %self.config.default_locale,
                "unsupported locale, falling back"
            );
            &self.config.default_locale
        }
    }

    fn cell(&self, locale: &str) -> CatalogCell {
        Arc::clone(&self.catalogs.entry(locale.to_string()).or_default())
    }

    async fn catalog(&self, locale: &str) -> Option<Arc<Catalog>> {
        let cell = self.cell(locale);
        let loaded = cell
            .get_or_try_init(|| async {
                let catalog = self.source.load(locale).await?;
                record_load(locale);
                Ok::<_, MessageError>(Arc::new(catalog))
            })
            .await;
        match loaded {
            Ok(catalog) => Some(Arc::clone(catalog)),
            Err(e) => {
                tracing::warn!(locale, error = %e, "failed to load message catalog");
                None
            }
        }
    }

    fn catalog_sync(&self, locale: &str) -> Option<Arc<Catalog>> {
        let cell = self.cell(locale);
        if let Some(catalog) = cell.get() {
            return Some(Arc::clone(catalog));
        }
        match self.source.load_sync(locale) {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                if cell.set(Arc::clone(&catalog)).is_ok() {
                    record_load(locale);
                }
                Some(cell.get().map_or(catalog, Arc::clone))
            }
            Err(e) => {
                tracing::warn!(locale, error = %e, "failed to load message catalog");
                None
            }
        }
    }

    /// Loads a locale's catalog ahead of first use.
    pub async fn preload(&self, locale: &str) -> bool {
        self.catalog(locale).await.is_some()
    }

    fn cache_key(locale: &str, key: &str, params: &Params, fallback: Option<&str>) -> String {
        let params_json = serde_json::to_string(params).unwrap_or_default();
        let mut cache_key = MessageCache::key(locale, key, &params_json);
        if let Some(fallback) = fallback {
            cache_key.push('|');
            cache_key.push_str(fallback);
        }
        cache_key
    }

    fn cached(&self, cache_key: &str) -> Option<String> {
        let hit = self.cache.get(cache_key);
        if hit.is_some() {
            counter!("maklar_message_cache_hits_total").increment(1);
        } else {
            counter!("maklar_message_cache_misses_total").increment(1);
        }
        hit
    }

    fn render(
        template: Option<String>,
        key: &str,
        params: &Params,
        fallback: Option<&str>,
        locale: &str,
        catalog: Option<&Catalog>,
    ) -> String {
        let template = template.unwrap_or_else(|| {
            tracing::debug!(locale, key, "message key not found");
            fallback.unwrap_or(key).to_string()
        });
        let words = YesNo {
            yes: catalog.and_then(|c| c.get("common.yes")).unwrap_or("ja"),
            no: catalog.and_then(|c| c.get("common.no")).unwrap_or("nej"),
        };
        substitute(&template, params, locale, words)
    }

    /// Resolves `key` for `locale`.
    pub async fn resolve(&self, locale: &str, key: &str, params: &Params) -> String {
        self.resolve_or(locale, key, params, None).await
    }

    /// Resolves `key` for `locale`, using `fallback` as the template when no
    /// catalog has the key.
    pub async fn resolve_or(
        &self,
        locale: &str,
        key: &str,
        params: &Params,
        fallback: Option<&str>,
    ) -> String {
        let locale = self.effective_locale(locale);
        let cache_key = Self::cache_key(locale, key, params, fallback);
        if let Some(message) = self.cached(&cache_key) {
            return message;
        }

        let primary = self.catalog(locale).await;
        let mut loaded = primary.is_some();
        let mut template = primary.as_deref().and_then(|c| c.get(key)).map(str::to_owned);
        if template.is_none() && locale != self.config.default_locale {
            let default = self.catalog(&self.config.default_locale).await;
            loaded &= default.is_some();
            template = default.as_deref().and_then(|c| c.get(key)).map(str::to_owned);
        }

        let message = Self::render(template, key, params, fallback, locale, primary.as_deref());
        // Results built without a catalog are not cached so the load is retried.
        if loaded {
            self.cache.insert(cache_key, message.clone());
        }
        message
    }

    /// Resolves `key` in the default locale without awaiting.
    pub fn resolve_sync(&self, key: &str, params: &Params) -> String {
        self.resolve_sync_or(key, params, None)
    }

    /// Synchronous [`resolve_or`](Self::resolve_or) in the default locale.
    pub fn resolve_sync_or(&self, key: &str, params: &Params, fallback: Option<&str>) -> String {
        let locale = self.config.default_locale.as_str();
        let cache_key = Self::cache_key(locale, key, params, fallback);
        if let Some(message) = self.cached(&cache_key) {
            return message;
        }

        let catalog = self.catalog_sync(locale);
        let template = catalog.as_deref().and_then(|c| c.get(key)).map(str::to_owned);
        let message = Self::render(template, key, params, fallback, locale, catalog.as_deref());
        if catalog.is_some() {
            self.cache.insert(cache_key, message.clone());
        }
        message
    }

    /// Resolves many `(key, params)` pairs concurrently into a key -> message map.
    pub async fn resolve_many(&self, locale: &str, entries: &[(String, Params)]) -> HashMap<String, String> {
        let resolved = join_all(entries.iter().map(|(key, params)| async move {
            (key.clone(), self.resolve(locale, key, params).await)
        }))
        .await;
        resolved.into_iter().collect()
    }

    /// Human-readable label of a field (`fields.<name>`), or its raw name.
    pub async fn label(&self, locale: &str, field: &FieldPath) -> String {
        let name = field.last_segment();
        self.resolve_or(locale, &format!("fields.{name}"), &Params::new(), Some(name))
            .await
    }

    /// Synchronous [`label`](Self::label) in the default locale.
    pub fn label_sync(&self, field: &FieldPath) -> String {
        let name = field.last_segment();
        self.resolve_sync_or(&format!("fields.{name}"), &Params::new(), Some(name))
    }
}

fn record_load(locale: &str) {
    counter!("maklar_catalog_loads_total", "locale" => locale.to_string()).increment(1);
    tracing::info!(locale, "message catalog loaded");
}
