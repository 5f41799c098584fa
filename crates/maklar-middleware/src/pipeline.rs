//! Fixed-order middleware pipeline.
//!
//! ```text
//! Request → RequestId → ErrorNormalization → RequestValidation → Handler
//! ```
//!
//! Request ID runs first so every response, including rejections, carries
//! the `x-request-id` header. Error normalization wraps validation and the
//! handler. Validation is optional per route.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{ErrorNormalizationMiddleware, RequestIdMiddleware, RequestValidationMiddleware};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Correlation id generation/propagation.
    RequestId = 1,
    /// Error envelope normalization.
    ErrorNormalization = 2,
    /// Request input validation.
    RequestValidation = 3,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::ErrorNormalization => "error_normalization",
            Self::RequestValidation => "request_validation",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::RequestId, Self::ErrorNormalization, Self::RequestValidation]
    }
}

/// An immutable middleware pipeline for one route.
///
/// # Example
///
/// ```
/// use maklar_middleware::{Pipeline, RequestValidationMiddleware, RouteValidation};
/// use maklar_messages::ErrorFormatter;
///
/// let pipeline = Pipeline::builder()
///     .validation(RequestValidationMiddleware::new(
///         RouteValidation::new(),
///         ErrorFormatter::default(),
///     ))
///     .build();
/// assert_eq!(
///     pipeline.stage_names(),
///     vec!["request_id", "error_normalization", "request_validation"]
/// );
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and then `handler`.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next.run(&mut ctx, request).await
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    trust_request_id: bool,
    expose_internal_errors: bool,
    validation: Option<RequestValidationMiddleware>,
}

impl PipelineBuilder {
    /// Starts with untrusted request ids and hidden internal errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses valid incoming `x-request-id` headers.
    #[must_use]
    pub fn trust_request_id(mut self, trust: bool) -> Self {
        self.trust_request_id = trust;
        self
    }

    /// Exposes internal error detail in every stage that renders envelopes.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Validates request input before the handler.
    #[must_use]
    pub fn validation(mut self, validation: RequestValidationMiddleware) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let request_id = if self.trust_request_id {
            RequestIdMiddleware::trust_incoming()
        } else {
            RequestIdMiddleware::new()
        };
        let mut stages: Vec<BoxedMiddleware> = vec![
            Arc::new(request_id),
            Arc::new(ErrorNormalizationMiddleware::new().expose_internal_errors(self.expose_internal_errors)),
        ];
        if let Some(validation) = self.validation {
            stages.push(Arc::new(validation.expose_internal_errors(self.expose_internal_errors)));
        }
        Pipeline { stages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::REQUEST_ID_HEADER;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/objekt")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<&str> = Stage::all().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["request_id", "error_normalization", "request_validation"]);
        assert!(Stage::RequestId < Stage::RequestValidation);
    }

    #[test]
    fn test_validation_stage_is_optional() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_names(), vec!["request_id", "error_normalization"]);
    }

    #[tokio::test]
    async fn test_handler_error_is_normalized_with_request_id() {
        let pipeline = Pipeline::builder().build();
        let response = pipeline
            .process(MiddlewareContext::new(), request(), |_ctx, _req| {
                Box::pin(async {
                    HttpResponse::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .body(Full::new(Bytes::from("stack trace")))
                        .unwrap()
                })
            })
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
