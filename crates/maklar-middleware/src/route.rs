//! Per-route validation configuration and the data handed to handlers.

use crate::sanitize::SanitizationProfile;
use maklar_schema::{Draft, EntitySchema};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The parts of a request that can be validated, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputStage {
    /// Request headers, keyed by lowercase name.
    Headers,
    /// Query string parameters.
    Query,
    /// Route parameters supplied by the router.
    Params,
    /// JSON body.
    Body,
}

impl InputStage {
    /// All stages in the order they run.
    pub const ALL: [Self; 4] = [Self::Headers, Self::Query, Self::Params, Self::Body];

    /// Stage name, used as the metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Query => "query",
            Self::Params => "params",
            Self::Body => "body",
        }
    }

    /// Headers are protocol metadata and skip sanitization.
    #[must_use]
    pub const fn is_sanitized(self) -> bool {
        !matches!(self, Self::Headers)
    }
}

impl std::fmt::Display for InputStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route parameters extracted by the router, attached as a request extension.
///
/// # Example
///
/// ```
/// use maklar_middleware::RouteParams;
///
/// let params: RouteParams = [("id", "42")].into_iter().collect();
/// assert_eq!(params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// Looks up one parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub(crate) fn to_draft(&self) -> Draft {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Validated, normalized request input, attached as a request extension.
///
/// Only the stages configured for the route are filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInput {
    /// Validated headers.
    pub headers: Option<Draft>,
    /// Validated query parameters.
    pub query: Option<Draft>,
    /// Validated route parameters.
    pub params: Option<Draft>,
    /// Validated body.
    pub body: Option<Draft>,
}

impl ValidatedInput {
    /// The validated data of one stage.
    #[must_use]
    pub fn get(&self, stage: InputStage) -> Option<&Draft> {
        match stage {
            InputStage::Headers => self.headers.as_ref(),
            InputStage::Query => self.query.as_ref(),
            InputStage::Params => self.params.as_ref(),
            InputStage::Body => self.body.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, stage: InputStage, draft: Draft) {
        let slot = match stage {
            InputStage::Headers => &mut self.headers,
            InputStage::Query => &mut self.query,
            InputStage::Params => &mut self.params,
            InputStage::Body => &mut self.body,
        };
        *slot = Some(draft);
    }
}

/// Which schemas a route validates its input against.
///
/// # Example
///
/// ```
/// use maklar_middleware::{InputStage, RouteValidation, SanitizationProfile};
/// use maklar_schema::property;
/// use std::sync::Arc;
///
/// let route = RouteValidation::new()
///     .query(Arc::new(property::filter_schema()))
///     .sanitization(SanitizationProfile::Strict);
/// assert!(route.schema(InputStage::Query).is_some());
/// assert!(route.schema(InputStage::Body).is_none());
/// ```
#[derive(Clone)]
pub struct RouteValidation {
    headers: Option<Arc<dyn EntitySchema>>,
    query: Option<Arc<dyn EntitySchema>>,
    params: Option<Arc<dyn EntitySchema>>,
    body: Option<Arc<dyn EntitySchema>>,
    sanitization: Option<SanitizationProfile>,
}

impl std::fmt::Debug for RouteValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = |schema: &Option<Arc<dyn EntitySchema>>| {
            schema.as_ref().map(|s| s.name().to_string())
        };
        f.debug_struct("RouteValidation")
            .field("headers", &name(&self.headers))
            .field("query", &name(&self.query))
            .field("params", &name(&self.params))
            .field("body", &name(&self.body))
            .field("sanitization", &self.sanitization)
            .finish()
    }
}

impl Default for RouteValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteValidation {
    /// No schemas, `moderate` sanitization.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: None,
            query: None,
            params: None,
            body: None,
            sanitization: Some(SanitizationProfile::default()),
        }
    }

    /// Validates headers against `schema`.
    pub fn headers(mut self, schema: Arc<dyn EntitySchema>) -> Self {
        self.headers = Some(schema);
        self
    }

    /// Validates the query string against `schema`.
    pub fn query(mut self, schema: Arc<dyn EntitySchema>) -> Self {
        self.query = Some(schema);
        self
    }

    /// Validates route parameters against `schema`.
    pub fn params(mut self, schema: Arc<dyn EntitySchema>) -> Self {
        self.params = Some(schema);
        self
    }

    /// Validates the JSON body against `schema`.
    pub fn body(mut self, schema: Arc<dyn EntitySchema>) -> Self {
        self.body = Some(schema);
        self
    }

    /// Sets the sanitization profile for query, params and body.
    pub fn sanitization(mut self, profile: SanitizationProfile) -> Self {
        self.sanitization = Some(profile);
        self
    }

    /// Turns sanitization off for this route.
    pub fn without_sanitization(mut self) -> Self {
        self.sanitization = None;
        self
    }

    /// The schema configured for `stage`.
    #[must_use]
    pub fn schema(&self, stage: InputStage) -> Option<&Arc<dyn EntitySchema>> {
        match stage {
            InputStage::Headers => self.headers.as_ref(),
            InputStage::Query => self.query.as_ref(),
            InputStage::Params => self.params.as_ref(),
            InputStage::Body => self.body.as_ref(),
        }
    }

    /// The sanitization profile, `None` when disabled.
    #[must_use]
    pub const fn sanitization_profile(&self) -> Option<SanitizationProfile> {
        self.sanitization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_order_and_sanitization() {
        let names: Vec<&str> = InputStage::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["headers", "query", "params", "body"]);
        assert!(!InputStage::Headers.is_sanitized());
        assert!(InputStage::ALL[1..].iter().all(|s| s.is_sanitized()));
    }

    #[test]
    fn test_route_params_to_draft() {
        let params: RouteParams = [("id", "42"), ("slug", "villa")].into_iter().collect();
        let draft = params.to_draft();
        assert_eq!(draft["id"], json!("42"));
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_validated_input_slots() {
        let mut input = ValidatedInput::default();
        let draft = json!({"page": 1}).as_object().cloned().unwrap();
        input.set(InputStage::Query, draft.clone());
        assert_eq!(input.get(InputStage::Query), Some(&draft));
        assert!(input.get(InputStage::Body).is_none());
    }

    #[test]
    fn test_sanitization_can_be_disabled() {
        assert_eq!(
            RouteValidation::new().sanitization_profile(),
            Some(SanitizationProfile::Moderate)
        );
        assert!(RouteValidation::new().without_sanitization().sanitization_profile().is_none());
    }
}
