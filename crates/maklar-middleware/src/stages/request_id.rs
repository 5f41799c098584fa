//! Request ID middleware.
//!
//! Assigns every request a correlation id (UUID v7), stores it in the
//! [`MiddlewareContext`] and echoes it in the `x-request-id` response
//! header, on success and error responses alike.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use http::HeaderValue;
use maklar_core::RequestId;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or propagates request IDs.
///
/// Incoming `x-request-id` headers are ignored unless the middleware was
/// built with [`trust_incoming`](Self::trust_incoming); untrusted or
/// malformed ids are replaced by a fresh one.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Always generates a new id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses valid incoming ids, for calls from trusted upstream services.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self { trust_incoming: true }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await;

            response.headers_mut().insert(
                REQUEST_ID_HEADER,
                HeaderValue::from_str(&request_id.to_string()).expect("valid header value"),
            );
            response
        })
    }
}
