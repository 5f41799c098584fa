//! Error normalization middleware.
//!
//! Handlers may answer with bare error statuses. This stage rewrites every
//! 4xx/5xx response that is not already an envelope into one:
//!
//! - 5xx becomes the fixed internal envelope (`INTERNAL_SERVER_ERROR`, 500),
//!   with the generic message and no detail unless internal errors are
//!   exposed.
//! - 4xx keeps its status, with a code derived from it and the canonical
//!   reason as message.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use chrono::Utc;
use http::StatusCode;
use maklar_core::{AppError, ErrorBody, ErrorEnvelope};

/// Error normalization middleware.
#[derive(Debug, Clone, Default)]
pub struct ErrorNormalizationMiddleware {
    expose_internal_errors: bool,
}

impl ErrorNormalizationMiddleware {
    /// Creates the middleware with internal detail hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to expose internal error details.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    fn normalize(&self, ctx: &MiddlewareContext, response: Response) -> Response {
        let status = response.status();
        if response.is_envelope() || !(status.is_client_error() || status.is_server_error()) {
            return response;
        }

        if status.is_server_error() {
            tracing::error!(
                request_id = %ctx.request_id(),
                status = status.as_u16(),
                "handler returned a server error"
            );
            let error = AppError::internal(format!("handler responded with {status}"));
            return Response::app_error(&error, ctx.request_id(), self.expose_internal_errors);
        }

        Response::envelope(&ErrorEnvelope {
            error: ErrorBody {
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
                code: status_to_code(status),
                status_code: status.as_u16(),
                request_id: ctx.request_id(),
                timestamp: Utc::now(),
                cause: None,
            },
            errors: None,
        })
    }
}

fn status_to_code(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "BAD_REQUEST".to_string(),
        401 => "UNAUTHORIZED".to_string(),
        403 => "FORBIDDEN".to_string(),
        404 => "NOT_FOUND".to_string(),
        405 => "METHOD_NOT_ALLOWED".to_string(),
        409 => "CONFLICT".to_string(),
        413 => "PAYLOAD_TOO_LARGE".to_string(),
        415 => "UNSUPPORTED_MEDIA_TYPE".to_string(),
        422 => "UNPROCESSABLE_ENTITY".to_string(),
        429 => "RATE_LIMITED".to_string(),
        other => format!("HTTP_{other}"),
    }
}

impl Middleware for ErrorNormalizationMiddleware {
    fn name(&self) -> &'static str {
        "error_normalization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let response = next.run(ctx, request).await;
            self.normalize(ctx, response)
        })
    }
}
