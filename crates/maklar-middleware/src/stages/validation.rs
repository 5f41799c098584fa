//! Request validation middleware.
//!
//! Validates the configured request parts in fixed order (headers, query,
//! route params, body) and stops at the first stage that fails: later
//! stages and the handler never run. On success the normalized input is
//! attached to the request as a [`ValidatedInput`] extension.
//!
//! Every failure produces the same envelope shape:
//!
//! ```json
//! {
//!   "error": {
//!     "message": "Valideringsfel",
//!     "code": "VALIDATION_ERROR",
//!     "statusCode": 400,
//!     "requestId": "0190f7c2-...",
//!     "timestamp": "2024-05-01T12:00:00Z"
//!   },
//!   "errors": [{ "field": "kommun", "message": "Kommun är obligatoriskt", "code": "required" }]
//! }
//! ```
//!
//! A schema that panics is reported as an internal error (500) instead.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::route::{InputStage, RouteParams, RouteValidation, ValidatedInput};
use crate::sanitize::Sanitizer;
use crate::types::{Request, Response, ResponseExt};
use bytes::Bytes;
use http::{header, HeaderMap, Method};
use http_body_util::{BodyExt, Full};
use maklar_core::AppError;
use maklar_messages::ErrorFormatter;
use maklar_schema::{Draft, EntitySchema};
use metrics::counter;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Catalog key for a body that is not JSON.
const INVALID_JSON_KEY: &str = "validation.invalid_json";
/// Catalog key for a body sent with another content type.
const UNSUPPORTED_MEDIA_TYPE_KEY: &str = "validation.unsupported_media_type";
/// Catalog key for JSON that is not an object.
const INVALID_BODY_KEY: &str = "validation.invalid_body";

/// Validates request input against a route's schemas.
#[derive(Debug, Clone)]
pub struct RequestValidationMiddleware {
    route: RouteValidation,
    formatter: ErrorFormatter,
    include_params: bool,
    expose_internal_errors: bool,
}

impl RequestValidationMiddleware {
    /// Creates the middleware for one route.
    pub fn new(route: RouteValidation, formatter: ErrorFormatter) -> Self {
        Self {
            route,
            formatter,
            include_params: false,
            expose_internal_errors: false,
        }
    }

    /// Attaches the message parameters to each reported error.
    #[must_use]
    pub fn include_params(mut self, include: bool) -> Self {
        self.include_params = include;
        self
    }

    /// Adds the internal cause to 500 envelopes.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// The route configuration.
    pub fn route(&self) -> &RouteValidation {
        &self.route
    }

    fn locale(&self, ctx: &mut MiddlewareContext, request: &Request) -> String {
        if let Some(locale) = ctx.locale() {
            return locale.to_string();
        }
        let accept = request
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        let locale = self.formatter.resolver().negotiate(accept);
        ctx.set_locale(locale.clone());
        locale
    }

    async fn validate(&self, locale: &str, request: Request) -> Result<Request, (InputStage, AppError)> {
        let (mut parts, body) = request.into_parts();
        let mut input = ValidatedInput::default();

        for stage in [InputStage::Headers, InputStage::Query, InputStage::Params] {
            let Some(schema) = self.route.schema(stage) else {
                continue;
            };
            let draft = match stage {
                InputStage::Headers => header_draft(&parts.headers),
                InputStage::Query => query_draft(parts.uri.query()).map_err(|e| (stage, e))?,
                _ => parts
                    .extensions
                    .get::<RouteParams>()
                    .map(RouteParams::to_draft)
                    .unwrap_or_default(),
            };
            let valid = self.run_stage(stage, schema.as_ref(), draft, locale).await?;
            input.set(stage, valid);
        }

        let body = match self.route.schema(InputStage::Body) {
            Some(schema) if carries_body(&parts.method) => {
                let bytes = collect(body).await;
                let draft = self
                    .body_draft(&parts.headers, &bytes, locale)
                    .await
                    .map_err(|e| (InputStage::Body, e))?;
                let valid = self
                    .run_stage(InputStage::Body, schema.as_ref(), draft, locale)
                    .await?;
                input.set(InputStage::Body, valid);
                Full::new(bytes)
            }
            _ => body,
        };

        parts.extensions.insert(input);
        Ok(Request::from_parts(parts, body))
    }

    async fn run_stage(
        &self,
        stage: InputStage,
        schema: &dyn EntitySchema,
        mut draft: Draft,
        locale: &str,
    ) -> Result<Draft, (InputStage, AppError)> {
        if let Some(profile) = self.route.sanitization_profile().filter(|_| stage.is_sanitized()) {
            let sanitizer = Sanitizer::new(profile);
            draft.values_mut().for_each(|value| sanitizer.sanitize_value(value));
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| schema.validate(&draft)));
        match outcome {
            Ok(Ok(valid)) => Ok(valid),
            Ok(Err(violations)) => {
                let errors = self
                    .formatter
                    .format(&violations, locale, self.include_params)
                    .await;
                Err((stage, AppError::validation(errors)))
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                Err((
                    stage,
                    AppError::internal(format!(
                        "schema `{}` panicked during {stage} validation: {detail}",
                        schema.name()
                    )),
                ))
            }
        }
    }

    async fn body_draft(&self, headers: &HeaderMap, bytes: &Bytes, locale: &str) -> Result<Draft, AppError> {
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"));
        if !is_json {
            return Err(self.top_level(locale, "unsupported_media_type", UNSUPPORTED_MEDIA_TYPE_KEY).await);
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(self.top_level(locale, "invalid_body", INVALID_BODY_KEY).await),
            Err(e) => {
                tracing::debug!(error = %e, "request body is not valid JSON");
                Err(self.top_level(locale, "invalid_json", INVALID_JSON_KEY).await)
            }
        }
    }

    async fn top_level(&self, locale: &str, code: &str, key: &str) -> AppError {
        AppError::validation(vec![self.formatter.top_level(locale, code, key).await])
    }

    fn reject(&self, ctx: &MiddlewareContext, stage: InputStage, error: &AppError) -> Response {
        counter!("maklar_validation_failures_total", "stage" => stage.as_str()).increment(1);
        match error {
            AppError::Validation { errors, .. } => tracing::debug!(
                request_id = %ctx.request_id(),
                stage = stage.as_str(),
                errors = errors.len(),
                "request validation failed"
            ),
            other => tracing::error!(
                request_id = %ctx.request_id(),
                stage = stage.as_str(),
                error = %other,
                "request validation aborted"
            ),
        }
        Response::app_error(error, ctx.request_id(), self.expose_internal_errors)
    }
}

impl Middleware for RequestValidationMiddleware {
    fn name(&self) -> &'static str {
        "request_validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let locale = self.locale(ctx, &request);
            match self.validate(&locale, request).await {
                Ok(request) => next.run(ctx, request).await,
                Err((stage, error)) => self.reject(ctx, stage, &error),
            }
        })
    }
}

fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

async fn collect(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

/// Header names are lowercase; repeated headers are joined with `", "`.
/// Values that are not visible ASCII are skipped.
fn header_draft(headers: &HeaderMap) -> Draft {
    let mut draft = Draft::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        match draft.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                draft.insert(name.as_str().to_string(), Value::String(value.to_string()));
            }
        }
    }
    draft
}

/// Every value is a string; for repeated keys the last one wins.
fn query_draft(query: Option<&str>) -> Result<Draft, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| AppError::bad_request(format!("malformed query string: {e}")))?;
    Ok(pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_header_draft_joins_repeats() {
        let mut headers = HeaderMap::new();
        headers.append("x-tenant", HeaderValue::from_static("a"));
        headers.append("x-tenant", HeaderValue::from_static("b"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let draft = header_draft(&headers);
        assert_eq!(draft["x-tenant"], json!("a, b"));
        assert_eq!(draft["accept"], json!("application/json"));
    }

    #[test]
    fn test_query_draft() {
        let draft = query_draft(Some("kommun=Uppsala&page=2&page=3&q=a%20b")).unwrap();
        assert_eq!(draft["kommun"], json!("Uppsala"));
        assert_eq!(draft["page"], json!("3"));
        assert_eq!(draft["q"], json!("a b"));
        assert!(query_draft(None).unwrap().is_empty());
    }

    #[test]
    fn test_only_get_and_head_skip_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PATCH));
    }

    #[test]
    fn test_panic_message() {
        let text: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(text.as_ref()), "boom");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn std::any::Any + Send> = Box::new(1_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
