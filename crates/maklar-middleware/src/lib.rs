//! # Maklar Middleware
//!
//! Request validation for HTTP services built on `http` types.
//!
//! ## Pipeline
//!
//! ```text
//! Request → RequestId → ErrorNormalization → RequestValidation → Handler
//! ```
//!
//! [`RequestValidationMiddleware`] checks the parts of a request configured
//! in a [`RouteValidation`] in fixed order (headers, query, route params,
//! body), stopping at the first failing stage. Query, params and body are
//! sanitized first; headers never are. Handlers read the normalized input
//! from the [`ValidatedInput`] request extension.
//!
//! Failures are answered with the standard error envelope: 400 with
//! itemized errors for invalid input, 500 with a generic message for
//! internal failures. Every response carries `x-request-id`.
//!
//! ## Example
//!
//! ```
//! use maklar_middleware::{
//!     MiddlewareContext, Pipeline, RequestValidationMiddleware, RouteValidation, ValidatedInput,
//! };
//! use maklar_messages::ErrorFormatter;
//! use maklar_schema::property;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let route = RouteValidation::new().query(Arc::new(property::filter_schema()));
//! let pipeline = Pipeline::builder()
//!     .validation(RequestValidationMiddleware::new(route, ErrorFormatter::default()))
//!     .build();
//!
//! let request = http::Request::builder()
//!     .uri("/objekt?limit=500")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, |_ctx, request| {
//!         assert!(request.extensions().get::<ValidatedInput>().is_some());
//!         Box::pin(async { http::Response::new(http_body_util::Full::new(bytes::Bytes::new())) })
//!     })
//!     .await;
//! assert_eq!(response.status(), 400);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/maklar-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod route;
pub mod sanitize;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Handler, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder, Stage};
pub use route::{InputStage, RouteParams, RouteValidation, ValidatedInput};
pub use sanitize::{SanitizationProfile, Sanitized, Sanitizer};
pub use stages::{
    ErrorNormalizationMiddleware, RequestIdMiddleware, RequestValidationMiddleware,
    REQUEST_ID_HEADER,
};
pub use types::{EnvelopeMarker, Request, Response, ResponseExt};
