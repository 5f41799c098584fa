//! Common types used throughout the middleware chain.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use maklar_core::{AppError, ErrorEnvelope, RequestId};

/// The HTTP request type used in the middleware chain.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware chain.
pub type Response = http::Response<Full<Bytes>>;

/// Response extension marking a body that already is an [`ErrorEnvelope`].
///
/// Error normalization leaves such responses untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeMarker;

/// Extension trait for building envelope responses.
pub trait ResponseExt {
    /// Serializes `envelope` as a JSON response with its own status code.
    fn envelope(envelope: &ErrorEnvelope) -> Response;

    /// Renders `error` as an envelope response.
    fn app_error(error: &AppError, request_id: RequestId, expose_internal: bool) -> Response;

    /// Returns `true` if the body is an error envelope.
    fn is_envelope(&self) -> bool;
}

impl ResponseExt for Response {
    fn envelope(envelope: &ErrorEnvelope) -> Response {
        let status = StatusCode::from_u16(envelope.error.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_vec(envelope).unwrap_or_default();

        let mut response = http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build envelope response");
        response.extensions_mut().insert(EnvelopeMarker);
        response
    }

    fn app_error(error: &AppError, request_id: RequestId, expose_internal: bool) -> Response {
        Self::envelope(&error.to_envelope(request_id, expose_internal))
    }

    fn is_envelope(&self) -> bool {
        self.extensions().get::<EnvelopeMarker>().is_some()
    }
}
