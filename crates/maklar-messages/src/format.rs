//! Violation to `ValidationError` formatting.
//!
//! Both entry points produce the same shape: one entry per violation,
//! sorted by field path (stable for equal paths). The sync path resolves in
//! the default locale; the async path resolves in any supported locale and
//! can attach the substitution parameters.

use crate::resolver::MessageResolver;
use futures_util::future::join_all;
use maklar_core::{ParamValue, Params, ValidationError};
use maklar_schema::Violation;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Turns raw violations into localized, field-addressable errors.
#[derive(Debug, Clone)]
pub struct ErrorFormatter {
    resolver: Arc<MessageResolver>,
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new(Arc::new(MessageResolver::embedded()))
    }
}

impl ErrorFormatter {
    /// Creates a formatter over a shared resolver.
    pub fn new(resolver: Arc<MessageResolver>) -> Self {
        Self { resolver }
    }

    /// The underlying resolver.
    #[must_use]
    pub fn resolver(&self) -> &Arc<MessageResolver> {
        &self.resolver
    }

    /// Formats in the default locale without awaiting. Parameters are not attached.
    pub fn format_sync(&self, violations: &[Violation]) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = violations
            .iter()
            .map(|violation| {
                let mut params = violation.params.clone();
                if !violation.path.is_root() {
                    params
                        .entry("field".to_string())
                        .or_insert_with(|| ParamValue::Text(self.resolver.label_sync(&violation.path)));
                }
                let message = self
                    .resolver
                    .resolve_sync(&violation.kind.message_key(), &params);
                ValidationError::new(violation.path.clone(), message, violation.code())
            })
            .collect();
        sort_by_field(&mut errors);
        errors
    }

    /// Formats in `locale`, resolving every message concurrently.
    ///
    /// With `include_params` each entry carries the violation's own
    /// parameters (not the resolved field label).
    pub async fn format(
        &self,
        violations: &[Violation],
        locale: &str,
        include_params: bool,
    ) -> Vec<ValidationError> {
        let mut errors = join_all(
            violations
                .iter()
                .map(|violation| self.format_one(violation, locale, include_params)),
        )
        .await;
        sort_by_field(&mut errors);
        errors
    }

    async fn format_one(&self, violation: &Violation, locale: &str, include_params: bool) -> ValidationError {
        let mut params = violation.params.clone();
        if !violation.path.is_root() && !params.contains_key("field") {
            let label = self.resolver.label(locale, &violation.path).await;
            params.insert("field".to_string(), ParamValue::Text(label));
        }
        let message = self
            .resolver
            .resolve(locale, &violation.kind.message_key(), &params)
            .await;
        let error = ValidationError::new(violation.path.clone(), message, violation.code());
        if include_params {
            error.with_params(violation.params.clone())
        } else {
            error
        }
    }

    /// A whole-entity error (`field == ""`) in the default locale.
    pub fn top_level_sync(&self, code: &str, key: &str) -> ValidationError {
        ValidationError::top_level(self.resolver.resolve_sync(key, &Params::new()), code)
    }

    /// A whole-entity error (`field == ""`) in `locale`.
    pub async fn top_level(&self, locale: &str, code: &str, key: &str) -> ValidationError {
        let message = self.resolver.resolve(locale, key, &Params::new()).await;
        ValidationError::top_level(message, code)
    }
}

fn sort_by_field(errors: &mut [ValidationError]) {
    errors.sort_by(|a, b| a.field.cmp(&b.field));
}

/// All messages per field, in error order.
pub fn group_by_field(errors: &[ValidationError]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for error in errors {
        grouped
            .entry(error.field.as_str().to_string())
            .or_default()
            .push(error.message.clone());
    }
    grouped
}

/// The first message per field.
pub fn first_by_field(errors: &[ValidationError]) -> BTreeMap<String, String> {
    let mut first = BTreeMap::new();
    for error in errors {
        first
            .entry(error.field.as_str().to_string())
            .or_insert_with(|| error.message.clone());
    }
    first
}
