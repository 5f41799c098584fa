//! # Maklar Messages
//!
//! Localized validation messages.
//!
//! - [`Catalog`] / [`CatalogSource`] - per-locale template trees, embedded or read from disk
//! - [`MessageResolver`] - lazy, de-duplicated catalog loading and `{param}` substitution
//! - [`MessageCache`] - bounded, TTL-expiring cache of resolved messages
//! - [`ErrorFormatter`] - raw violations to sorted, field-addressable [`ValidationError`]s
//!
//! ```
//! use maklar_core::Params;
//! use maklar_messages::MessageResolver;
//!
//! let resolver = MessageResolver::embedded();
//! assert_eq!(resolver.resolve_sync("common.yes", &Params::new()), "ja");
//! assert_eq!(resolver.resolve_sync("no.such.key", &Params::new()), "no.such.key");
//! ```
//!
//! [`ValidationError`]: maklar_core::ValidationError

#![doc(html_root_url = "https://docs.rs/maklar-messages/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod catalog;
mod error;
mod format;
mod resolver;
mod substitute;

pub use cache::{CacheStats, MessageCache, MessageCacheConfig};
pub use catalog::{Catalog, CatalogSource, DirectoryCatalogs, EmbeddedCatalogs};
pub use error::{MessageError, MessageResult};
pub use format::{first_by_field, group_by_field, ErrorFormatter};
pub use resolver::{MessageResolver, ResolverConfig, DEFAULT_LOCALE};

/// Catalog key of the generic submit-failure message.
pub const SUBMIT_FAILED_KEY: &str = "form.submit_failed";
