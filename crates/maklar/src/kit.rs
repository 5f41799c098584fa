//! Configuration-driven wiring of the shared validation components.

use maklar_config::{ConfigError, MaklarConfig};
use maklar_forms::FormController;
use maklar_messages::{
    CatalogSource, DirectoryCatalogs, EmbeddedCatalogs, ErrorFormatter, MessageCache,
    MessageCacheConfig, MessageResolver, ResolverConfig,
};
use maklar_middleware::{Pipeline, RequestValidationMiddleware, RouteValidation};
use maklar_schema::{contact, property, EntitySchema, SchemaError};
use maklar_telemetry::{TelemetryConfig, TelemetryError};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling a [`ValidationKit`].
#[derive(Debug, Error)]
pub enum KitError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A built-in schema could not be composed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// The built-in entity schemas, composed once and shared.
#[derive(Clone)]
pub struct EntitySchemas {
    /// Contact create, discriminated on `typ`.
    pub contact_create: Arc<dyn EntitySchema>,
    /// Contact edit.
    pub contact_update: Arc<dyn EntitySchema>,
    /// Contact search.
    pub contact_filter: Arc<dyn EntitySchema>,
    /// Property create with cross-field rules.
    pub property_create: Arc<dyn EntitySchema>,
    /// Property edit with cross-field rules.
    pub property_update: Arc<dyn EntitySchema>,
    /// Property search.
    pub property_filter: Arc<dyn EntitySchema>,
}

impl std::fmt::Debug for EntitySchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchemas")
            .field("contact_create", &self.contact_create.name())
            .field("contact_update", &self.contact_update.name())
            .field("contact_filter", &self.contact_filter.name())
            .field("property_create", &self.property_create.name())
            .field("property_update", &self.property_update.name())
            .field("property_filter", &self.property_filter.name())
            .finish()
    }
}

impl EntitySchemas {
    fn compose(config: &MaklarConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            contact_create: Arc::new(contact::create_schema()?),
            contact_update: Arc::new(contact::update_schema()),
            contact_filter: Arc::new(contact::filter_schema()),
            property_create: Arc::new(property::create_schema(&config.policy)),
            property_update: Arc::new(property::update_schema(&config.policy)),
            property_filter: Arc::new(property::filter_schema()),
        })
    }
}

/// One resolver, formatter and schema set for a whole service.
///
/// # Example
///
/// ```
/// use maklar::{MaklarConfig, ValidationKit};
///
/// let kit = ValidationKit::from_config(&MaklarConfig::default()).unwrap();
/// assert_eq!(kit.resolver().default_locale(), "sv");
///
/// let mut form = kit.contact_form();
/// form.change("typ", serde_json::json!("foretag"));
/// assert!(form.should_show("organisationsnummer"));
/// assert!(!form.should_show("personnummer"));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationKit {
    config: MaklarConfig,
    formatter: ErrorFormatter,
    schemas: EntitySchemas,
}

impl ValidationKit {
    /// Validates `config` and builds the shared components.
    ///
    /// Catalogs come from `messages.catalog_dir` when set, otherwise from
    /// the embedded `sv`/`en` catalogs.
    ///
    /// # Errors
    ///
    /// Returns `KitError::Config` for an invalid configuration and
    /// `KitError::Schema` if a built-in schema cannot be composed.
    pub fn from_config(config: &MaklarConfig) -> Result<Self, KitError> {
        config.validate()?;

        let source: Arc<dyn CatalogSource> = match &config.messages.catalog_dir {
            Some(dir) => Arc::new(DirectoryCatalogs::new(dir)),
            None => Arc::new(EmbeddedCatalogs),
        };
        let cache = Arc::new(MessageCache::new(MessageCacheConfig {
            max_entries: config.messages.cache.max_entries,
            ttl: config.messages.cache.ttl(),
        }));
        let resolver = Arc::new(MessageResolver::new(
            source,
            cache,
            ResolverConfig {
                default_locale: config.messages.default_locale.clone(),
                supported_locales: config.messages.supported_locales.clone(),
            },
        ));

        let schemas = EntitySchemas::compose(config)?;

        tracing::info!(
            locale = %config.messages.default_locale,
            catalog_dir = ?config.messages.catalog_dir,
            sanitization = %config.http.sanitization,
            "validation kit ready"
        );

        Ok(Self {
            config: config.clone(),
            formatter: ErrorFormatter::new(resolver),
            schemas,
        })
    }

    /// The configuration the kit was built from.
    #[must_use]
    pub fn config(&self) -> &MaklarConfig {
        &self.config
    }

    /// The shared message resolver.
    #[must_use]
    pub fn resolver(&self) -> &Arc<MessageResolver> {
        self.formatter.resolver()
    }

    /// The shared error formatter.
    #[must_use]
    pub fn formatter(&self) -> &ErrorFormatter {
        &self.formatter
    }

    /// The built-in entity schemas.
    #[must_use]
    pub fn schemas(&self) -> &EntitySchemas {
        &self.schemas
    }

    /// A form controller over `schema` in the configured validation mode.
    #[must_use]
    pub fn form(&self, schema: Arc<dyn EntitySchema>) -> FormController {
        FormController::new(schema, self.formatter.clone()).with_mode(self.config.validation.form_mode)
    }

    /// Contact create form.
    #[must_use]
    pub fn contact_form(&self) -> FormController {
        self.form(Arc::clone(&self.schemas.contact_create))
    }

    /// Property create form.
    #[must_use]
    pub fn property_form(&self) -> FormController {
        self.form(Arc::clone(&self.schemas.property_create))
    }

    /// A route with the configured sanitization profile and no schemas yet.
    #[must_use]
    pub fn route(&self) -> RouteValidation {
        RouteValidation::new().sanitization(self.config.http.sanitization)
    }

    /// The validation stage for `route`.
    #[must_use]
    pub fn validation(&self, route: RouteValidation) -> RequestValidationMiddleware {
        RequestValidationMiddleware::new(route, self.formatter.clone())
            .include_params(self.config.validation.include_params)
    }

    /// The full middleware pipeline for `route`.
    #[must_use]
    pub fn pipeline(&self, route: RouteValidation) -> Pipeline {
        Pipeline::builder()
            .trust_request_id(self.config.http.trust_request_id)
            .expose_internal_errors(self.config.http.expose_internal_errors)
            .validation(self.validation(route))
            .build()
    }
}

/// Installs logging and metrics from the configuration.
///
/// # Errors
///
/// Returns `KitError::Telemetry` if a subscriber or recorder is already
/// installed or the settings do not parse.
pub fn init_telemetry(config: &MaklarConfig) -> Result<(), KitError> {
    maklar_telemetry::init_telemetry(&TelemetryConfig {
        logging: config.logging.clone(),
        metrics: config.metrics.clone(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maklar_forms::ValidationMode;
    use maklar_middleware::SanitizationProfile;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MaklarConfig::default();
        config.messages.default_locale = "fi".to_string();
        let err = ValidationKit::from_config(&config).unwrap_err();
        assert!(matches!(err, KitError::Config(_)));
        assert!(err.to_string().contains("messages.default_locale"));
    }

    #[test]
    fn test_resolver_follows_messages_section() {
        let mut config = MaklarConfig::default();
        config.messages.default_locale = "en".to_string();
        let kit = ValidationKit::from_config(&config).unwrap();
        assert_eq!(kit.resolver().default_locale(), "en");
        assert!(kit.resolver().is_supported("sv"));
    }

    #[test]
    fn test_forms_use_configured_mode() {
        let mut config = MaklarConfig::default();
        config.validation.form_mode = ValidationMode::OnSubmit;
        let kit = ValidationKit::from_config(&config).unwrap();

        let mut form = kit.property_form();
        form.change("boarea", serde_json::json!(-5));
        assert!(form.field_state("boarea").status.error().is_none());
    }

    #[test]
    fn test_pipeline_stages() {
        let kit = ValidationKit::from_config(&MaklarConfig::development()).unwrap();
        let pipeline = kit.pipeline(kit.route());
        assert_eq!(
            pipeline.stage_names(),
            vec!["request_id", "error_normalization", "request_validation"]
        );
    }

    #[test]
    fn test_route_uses_configured_profile() {
        let mut config = MaklarConfig::default();
        config.http.sanitization = SanitizationProfile::Strict;
        let kit = ValidationKit::from_config(&config).unwrap();
        assert_eq!(kit.route().sanitization_profile(), Some(SanitizationProfile::Strict));
    }

    #[test]
    fn test_schema_names() {
        let kit = ValidationKit::from_config(&MaklarConfig::default()).unwrap();
        let debug = format!("{:?}", kit.schemas());
        assert!(debug.contains("contact_create"));
        assert!(debug.contains("property_filter"));
    }
}
