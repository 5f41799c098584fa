//! # Maklar
//!
//! **Validation toolkit for Swedish real-estate brokerage data**
//!
//! - **Domain validators** for personnummer, organisationsnummer, phone
//!   numbers, postal codes and fastighetsbeteckningar, each paired with a
//!   canonical formatter
//! - **Composable entity schemas** (create/update/filter) with cross-field
//!   business rules driven by a configurable [`RefinementPolicy`](schema::RefinementPolicy)
//! - **Localized messages** from `sv`/`en` catalogs with caching and
//!   parameter substitution
//! - **Form controllers** tracking dirty/touched/submitting state per field
//! - **Request middleware** validating headers, query, route params and body
//!   with a fixed error envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maklar::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("maklar.toml")?
//!     .with_env_prefix("MAKLAR")
//!     .load()?;
//! maklar::init_telemetry(&config)?;
//!
//! let kit = ValidationKit::from_config(&config)?;
//! let route = kit.route().body(kit.schemas().contact_create.clone());
//! let pipeline = kit.pipeline(route);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → ErrorNormalization → RequestValidation → Handler
//!                                              headers → query → params → body
//! ```

#![doc(html_root_url = "https://docs.rs/maklar/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod kit;

pub use kit::{init_telemetry, EntitySchemas, KitError, ValidationKit};

// Re-export core types
pub use maklar_core as core;

// Re-export identifier validators
pub use maklar_validators as validators;

// Re-export schema composition
pub use maklar_schema as schema;

// Re-export message resolution and formatting
pub use maklar_messages as messages;

// Re-export form controllers
pub use maklar_forms as forms;

// Re-export request middleware
pub use maklar_middleware as middleware;

// Re-export configuration
pub use maklar_config as config;

// Re-export telemetry
pub use maklar_telemetry as telemetry;

pub use maklar_config::{ConfigLoader, MaklarConfig};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use maklar::prelude::*;
///
/// let kit = ValidationKit::from_config(&MaklarConfig::default()).unwrap();
/// let route = kit.route().query(kit.schemas().property_filter.clone());
/// assert_eq!(route.sanitization_profile(), Some(SanitizationProfile::Moderate));
/// ```
pub mod prelude {
    pub use crate::{ConfigLoader, KitError, MaklarConfig, ValidationKit};
    pub use maklar_core::{AppError, ErrorEnvelope, RequestId, ValidationError};
    pub use maklar_forms::{FieldProps, FormController, SubmitOutcome, ValidationMode};
    pub use maklar_messages::{ErrorFormatter, MessageResolver};
    pub use maklar_middleware::{
        MiddlewareContext, Pipeline, RequestValidationMiddleware, RouteParams, RouteValidation,
        SanitizationProfile, ValidatedInput,
    };
    pub use maklar_schema::{Draft, EntitySchema, RefinementPolicy, SchemaVariant, Violation};
}
